//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Query translation
        .route("/translate", post(handlers::translate))
        .route("/variations", post(handlers::variations))
        // Backend search
        .route("/search", post(handlers::search))
        .route("/research", post(handlers::research))
        // URL metadata
        .route("/extract", post(handlers::extract))
        // Monitoring
        .route("/status", get(handlers::status))
        .route("/health", get(handlers::health))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}
