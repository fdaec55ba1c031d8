//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET    /health, /                         - Health check
/// - POST   /api/v1/checkout                   - Create checkout
/// - GET    /api/v1/checkout/{id}              - Get checkout (+ session)
/// - POST   /api/v1/checkout/{id}/confirm      - Issue invoice, start session
/// - GET    /api/v1/checkout/{id}/status       - Poll payment status
/// - DELETE /api/v1/checkout/{id}/session      - Drop local session
pub fn create_router(state: AppState) -> Router {
    // The checkout page polls from the storefront origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let checkout_routes = Router::new()
        .route("/{checkout_id}", get(handlers::get_checkout))
        .route("/{checkout_id}/confirm", post(handlers::confirm_checkout))
        .route("/{checkout_id}/status", get(handlers::checkout_status))
        .route("/{checkout_id}/session", delete(handlers::delete_session));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route("/api/v1/checkout", post(handlers::create_checkout))
        .nest("/api/v1/checkout", checkout_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
