//! Transport control handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use squeezer_core::{Feedback, SkillError, TransportCommand};
use tracing::error;

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ControlRequest {
    /// Player or speaker name; the default player when absent.
    #[serde(default)]
    pub backend: Option<String>,
    /// Required by `volume_set`.
    #[serde(default)]
    pub volume: Option<u8>,
}

/// Map a skill failure to a response.
pub fn skill_error(e: SkillError) -> (StatusCode, Json<ErrorResponse>) {
    error!("Request failed: {}", e);
    let status = match e {
        SkillError::Rpc(_) => StatusCode::BAD_GATEWAY,
        SkillError::Config(_) | SkillError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

/// POST /api/v1/controls/{command}
pub async fn run_command(
    State(state): State<Arc<AppState>>,
    Path(command): Path<String>,
    body: Option<Json<ControlRequest>>,
) -> Result<Json<Feedback>, (StatusCode, Json<ErrorResponse>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let Some(parsed) = TransportCommand::parse(&command, body.volume) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "Unknown or incomplete command: {}",
                command
            ))),
        ));
    };

    state
        .skill()
        .handle_command(parsed, body.backend.as_deref())
        .await
        .map(Json)
        .map_err(skill_error)
}
