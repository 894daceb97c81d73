//! HTTP router - answers every GET by path prefix

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::AppState;

/// Create the router for the fixture endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/", get(api::dispatch))
        .route("/{*path}", get(api::dispatch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
