//! Catalog cache and source index handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use squeezer_core::{Feedback, LoadSummary};

use super::{controls::skill_error, ErrorResponse};
use crate::state::AppState;

/// POST /api/v1/cache/update
///
/// Refresh the library cache if the server's catalog changed.
pub async fn update_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Feedback>, (StatusCode, Json<ErrorResponse>)> {
    state
        .skill()
        .update_cache()
        .await
        .map(Json)
        .map_err(skill_error)
}

/// POST /api/v1/sources/reload
pub async fn reload_sources(State(state): State<Arc<AppState>>) -> Json<LoadSummary> {
    Json(state.skill().reload_sources().await)
}

/// GET /api/v1/sources
pub async fn get_sources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LoadSummary>, (StatusCode, Json<ErrorResponse>)> {
    state.skill().last_load().await.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Sources have not been loaded")),
    ))
}
