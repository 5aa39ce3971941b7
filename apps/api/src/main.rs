mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::service::AnalysisService;
use crate::config::Config;
use crate::llm_client::OllamaClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CCN Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generation backend
    let llm = OllamaClient::new(
        &config.ollama_url,
        &config.model_name,
        config.generation_timeout_secs,
    );
    info!(
        "Generation backend initialized (url: {}, model: {})",
        config.ollama_url,
        llm.model()
    );
    check_model_available(&llm).await;

    let analysis = AnalysisService::new(
        Arc::new(llm),
        config.max_new_tokens,
        config.max_concurrent_generations,
    );
    info!(
        "Analysis service ready (max_new_tokens: {}, max_concurrent_generations: {})",
        config.max_new_tokens, config.max_concurrent_generations
    );

    // Build app state
    let state = AppState {
        analysis,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    match config.max_body_bytes {
        0 => info!("Request body limit disabled"),
        limit => info!("Request body limit: {limit} bytes"),
    }

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Best-effort startup probe. The backend owns the model weights, so a missing
/// model or an unreachable backend is reported but does not stop the service.
async fn check_model_available(llm: &OllamaClient) {
    match llm.is_model_available().await {
        Ok(true) => info!("Model '{}' is available", llm.model()),
        Ok(false) => warn!(
            "Model '{}' is not present in the backend; analysis requests will fail until it is pulled",
            llm.model()
        ),
        Err(e) => warn!("Could not reach generation backend: {e}"),
    }
}
