//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{expire_handler, get_handler, health_handler, set_handler, AppState};
use crate::store::MAX_VALUE_SIZE;

/// Largest request body read, room for a maximum-size value after JSON escaping.
/// Larger bodies are answered with 400.
pub const MAX_BODY_SIZE: usize = 8 * MAX_VALUE_SIZE;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /get` - Retrieve a value by key
/// - `POST /set` - Store a key-value pair
/// - `POST /expire` - Change the expiration of an existing key
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/get", post(get_handler))
        .route("/set", post(set_handler))
        .route("/expire", post(expire_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
