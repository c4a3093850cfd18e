//! Process startup shared by the binaries

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_fund::adapters::MfApiClient;
use domain_fund::{NavService, NavStore, UpstreamSource};
use infra_db::{create_lazy_pool, ensure_schema, PostgresNavStore};

use crate::config::ApiConfig;

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    /// Keeps stdout free for command output
    Stderr,
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level. JSON lines are emitted when
/// `log_json` is set.
pub fn init_tracing(config: &ApiConfig, target: LogTarget) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match (config.log_json, target) {
        (true, LogTarget::Stdout) => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        (true, LogTarget::Stderr) => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (false, LogTarget::Stdout) => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
        (false, LogTarget::Stderr) => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}

/// Builds the NAV service from configuration.
///
/// The pool is lazy, so this succeeds while the database is down; lookups
/// then degrade to the upstream source. Applying the schema is best-effort
/// for the same reason.
///
/// # Errors
///
/// Returns error if the database URL or the HTTP client cannot be built
pub async fn build_service(config: &ApiConfig) -> anyhow::Result<NavService> {
    let db_config = config.database_config();
    let pool = create_lazy_pool(&db_config)?;

    match ensure_schema(&pool).await {
        Ok(()) => tracing::info!("Database schema ready"),
        Err(e) => tracing::warn!(error = %e, degraded = true, "Could not apply schema, continuing without store"),
    }

    let store: Arc<dyn NavStore> = Arc::new(PostgresNavStore::new(pool, db_config.probe_timeout));
    let upstream: Arc<dyn UpstreamSource> = Arc::new(MfApiClient::new(config.upstream_config())?);

    Ok(NavService::new(store, upstream, config.backfill_config()))
}
