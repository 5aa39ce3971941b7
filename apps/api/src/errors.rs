use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::models::{ErrorKind, ErrorResult};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] ErrorResult),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, raw_output) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None)
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg, None)
            }
            AppError::Analysis(result) => match result.kind {
                ErrorKind::GenerationFailure => {
                    tracing::error!("Generation failure: {}", result.message);
                    (
                        StatusCode::BAD_GATEWAY,
                        "GENERATION_FAILURE",
                        result.message,
                        result.raw_output,
                    )
                }
                ErrorKind::ExtractionFailure => {
                    tracing::error!("Extraction failure: {}", result.message);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "EXTRACTION_FAILURE",
                        result.message,
                        result.raw_output,
                    )
                }
            },
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(raw_output) = raw_output {
            error["raw_output"] = json!(raw_output);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_extraction_failure_includes_raw_output() {
        let err = AppError::from(ErrorResult::extraction("pattern broke", "Who: ???"));
        let (status, json) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "EXTRACTION_FAILURE");
        assert_eq!(json["error"]["message"], "pattern broke");
        assert_eq!(json["error"]["raw_output"], "Who: ???");
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let (status, json) = render(AppError::NotFound("No route for /nope".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "No route for /nope");
    }

    #[tokio::test]
    async fn test_payload_too_large_envelope() {
        let err = AppError::PayloadTooLarge("length limit exceeded".to_string());
        let (status, json) = render(err).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_generation_failure_is_bad_gateway() {
        let err = AppError::from(ErrorResult::generation("connection refused"));
        let (status, json) = render(err).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "GENERATION_FAILURE");
        assert!(json["error"].get("raw_output").is_none());
    }
}
