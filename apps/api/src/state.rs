use crate::analysis::service::AnalysisService;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Note analysis pipeline. Holds the generation backend as `Arc<dyn TextGenerator>`.
    pub analysis: AnalysisService,
    pub config: Config,
}
