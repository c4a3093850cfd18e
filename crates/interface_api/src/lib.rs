//! HTTP API Layer
//!
//! This crate provides the REST API for the NAV cache using Axum, plus the
//! startup code shared by the `nav-api` server and the `nav-lookup` CLI.
//!
//! # Architecture
//!
//! - **Handlers**: NAV lookup and health checks
//! - **Middleware**: Request ids, tracing, request logging
//! - **DTOs**: Query string types
//! - **Error Handling**: Every failure renders as `{"error": message}`
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(service, config);
//! let app = create_router(state.clone());
//! axum::serve(listener, app).await?;
//! state.backfills.close();
//! state.backfills.wait().await;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod startup;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tokio_util::task::TaskTracker;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_fund::NavService;

use crate::config::ApiConfig;
use crate::handlers::{health, nav};
use crate::middleware::{request_logging_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: NavService,
    pub config: ApiConfig,
    /// Backfills started by requests, drained on shutdown
    pub backfills: TaskTracker,
}

impl AppState {
    pub fn new(service: NavService, config: ApiConfig) -> Self {
        Self {
            service,
            config,
            backfills: TaskTracker::new(),
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // NAV routes
    let nav_routes = Router::new()
        .route("/", get(nav::get_nav))
        .route("/api/v1/nav", get(nav::get_nav))
        .layer(axum_middleware::from_fn(request_logging_middleware));

    Router::new()
        .merge(public_routes)
        .merge(nav_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
