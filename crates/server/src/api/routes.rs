use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{cache, controls, handlers, middleware::metrics_middleware, query};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Phrase resolution and playback
        .route("/query", post(query::query))
        .route("/play", post(query::play))
        // Transport controls
        .route("/controls/{command}", post(controls::run_command))
        // Catalog cache and sources
        .route("/cache/update", post(cache::update_cache))
        .route("/sources/reload", post(cache::reload_sources))
        .route("/sources", get(cache::get_sources));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
