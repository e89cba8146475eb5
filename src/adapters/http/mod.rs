//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the billing routes with the cross-cutting layers
//! (request tracing, timeout, CORS).

pub mod billing;

use axum::{routing::get, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use billing::{billing_router, BillingAppState};

/// Build the complete application router.
///
/// # Routes
/// - `POST /api/webhooks/stripe`
/// - `GET /api/premium/status`
/// - `GET /health`
pub fn app_router(state: BillingAppState, server: &ServerConfig) -> Router {
    let origins = server.cors_allowed_origins().unwrap_or_default();

    Router::new()
        .nest("/api", billing_router())
        .route("/health", get(billing::health))
        .with_state(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(CorsLayer::new().allow_origin(AllowOrigin::list(origins)))
        .layer(TraceLayer::new_for_http())
}
