//! NAV Cache - API Server Binary
//!
//! This binary starts the HTTP API server for the NAV cache.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin nav-api
//!
//! # Run with environment variables
//! NAV_PORT=8080 NAV_DATABASE_URL=postgres://... cargo run --bin nav-api
//! ```
//!
//! # Environment Variables
//!
//! * `NAV_HOST` - Server host (default: 0.0.0.0)
//! * `NAV_PORT` - Server port (default: 8080)
//! * `NAV_DATABASE_URL` - PostgreSQL connection string
//! * `NAV_UPSTREAM_BASE_URL` - NAV history source (default: https://api.mfapi.in/mf/)
//! * `NAV_BATCH_SIZE` / `NAV_CONCURRENCY_LIMIT` - Backfill sizing (default: 1000 / 8)
//! * `NAV_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `NAV_LOG_JSON` - Emit JSON log lines (default: false)

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use interface_api::config::ApiConfig;
use interface_api::startup::{build_service, init_tracing, LogTarget};
use interface_api::{create_router, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, prepares the store and the
/// upstream client, and starts the HTTP server. On shutdown, backfills
/// that are still running are awaited before the process exits.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The database URL or HTTP client is invalid
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid NAV_* configuration")?;

    init_tracing(&config, LogTarget::Stdout);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        batch_size = config.batch_size,
        concurrency_limit = config.concurrency_limit,
        "Starting NAV Cache API Server"
    );

    let service = build_service(&config).await?;
    let state = AppState::new(service, config.clone());
    let app = create_router(state.clone());

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.backfills.close();
    tracing::info!(pending = state.backfills.len(), "Waiting for backfills to finish");
    state.backfills.wait().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
