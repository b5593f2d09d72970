//! Phrase resolution and playback handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use squeezer_core::{DispatchOutcome, Feedback, ResolvedQuery};
use tracing::info;

use super::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PhraseRequest {
    pub phrase: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResolvedQuery>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResolvedQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchOutcome>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn require_phrase(body: &PhraseRequest) -> Result<&str, ApiError> {
    let phrase = body.phrase.trim();
    if phrase.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("phrase must not be empty")),
        ));
    }
    Ok(phrase)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/query
///
/// Resolve a phrase without starting playback.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PhraseRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let phrase = require_phrase(&body)?;
    let result = state.skill().match_phrase(phrase).await;

    Ok(Json(QueryResponse {
        matched: result.is_some(),
        result,
    }))
}

/// POST /api/v1/play
///
/// Resolve a phrase and start playback of the match.
pub async fn play(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PhraseRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    let phrase = require_phrase(&body)?;
    let skill = state.skill();

    let Some(result) = skill.match_phrase(phrase).await else {
        info!("No match for {:?}", phrase);
        return Ok(Json(PlayResponse {
            matched: false,
            result: None,
            feedback: None,
            dispatch: None,
        }));
    };

    let report = skill.start(&result).await;
    Ok(Json(PlayResponse {
        matched: true,
        result: Some(result),
        feedback: Some(report.feedback),
        dispatch: report.dispatch,
    }))
}
