pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

fn body_limit(max_body_bytes: usize) -> DefaultBodyLimit {
    match max_body_bytes {
        0 => DefaultBodyLimit::disable(),
        limit => DefaultBodyLimit::max(limit),
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = body_limit(state.config.max_body_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handlers::handle_analyze))
        .route("/analyze/", post(handlers::handle_analyze))
        .fallback(not_found)
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::service::AnalysisService;
    use crate::config::Config;
    use crate::llm_client::StubGenerator;

    fn test_app() -> Router {
        let config = Config {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "gemma:2b-instruct".to_string(),
            max_new_tokens: 250,
            generation_timeout_secs: 5,
            max_concurrent_generations: 1,
            max_body_bytes: 0,
            port: 0,
            rust_log: "info".to_string(),
        };
        let analysis = AnalysisService::new(Arc::new(StubGenerator::replying("ok")), 250, 1);
        build_router(AppState { analysis, config })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let (status, json) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "ccn-analyzer");
        assert_eq!(json["model"], "gemma:2b-instruct");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_envelope() {
        let (status, json) = get_json("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "No route for /nope");
    }
}
