//! # Routes
//!
//! Axum router configuration for the checkout flow.

use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router
///
/// Routes:
///   - GET /                - Plain greeting
///   - GET /health          - Health check
///   - GET /pay             - Create order, 302 to the provider approval page
///   - GET /complete-order  - Provider return URL, captures `?token=`
///   - GET /cancel-order    - Provider cancel URL, 302 to `/`
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/pay", get(handlers::pay))
        .route("/complete-order", get(handlers::complete_order))
        .route("/cancel-order", get(handlers::cancel_order))
        // Middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        // State
        .with_state(state)
}
