//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::analysis::models::AnalysisReport;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub note_text: String,
}

/// POST /analyze
///
/// Accepts a Client Contact Note and returns its five-W assessment.
/// Empty notes are analyzed like any other; only a malformed body, or one over
/// the configured body limit, is rejected.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, AppError> {
    let Json(request) = payload.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
        _ => AppError::Validation(e.body_text()),
    })?;

    let span = info_span!("analyze", request_id = %Uuid::new_v4());
    let report = state
        .analysis
        .analyze(&request.note_text)
        .instrument(span)
        .await?;

    Ok(Json(report))
}
