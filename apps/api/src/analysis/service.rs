//! Analysis Service — note → prompt → generation → extraction.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, trace, warn};

use crate::analysis::extractor::extract_report;
use crate::analysis::models::{AnalysisReport, ErrorResult};
use crate::analysis::prompts::build_prompt;
use crate::llm_client::TextGenerator;

/// Runs one analysis per call against an injected generation backend.
///
/// Cheap to clone; clones share the backend and the generation permits.
#[derive(Clone)]
pub struct AnalysisService {
    generator: Arc<dyn TextGenerator>,
    max_new_tokens: u32,
    permits: Arc<Semaphore>,
}

impl AnalysisService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        max_new_tokens: u32,
        max_concurrent_generations: usize,
    ) -> Self {
        Self {
            generator,
            max_new_tokens,
            permits: Arc::new(Semaphore::new(max_concurrent_generations.max(1))),
        }
    }

    /// Analyzes a single note. A single generation attempt is made; any backend
    /// failure becomes a `GenerationFailure` result.
    pub async fn analyze(&self, note_text: &str) -> Result<AnalysisReport, ErrorResult> {
        let prompt = build_prompt(note_text);
        debug!(note_chars = note_text.chars().count(), "Built analysis prompt");

        let raw_output = {
            let _permit = self.permits.acquire().await.map_err(|e| {
                ErrorResult::generation(format!("Generation backend unavailable: {e}"))
            })?;

            self.generator
                .generate(&prompt, self.max_new_tokens, true)
                .await
                .map_err(|e| {
                    warn!("Generation failed: {e}");
                    ErrorResult::generation(format!("Text generation failed: {e}"))
                })?
        };

        if raw_output.trim().is_empty() {
            warn!("Generation returned no output");
            return Err(ErrorResult::generation("Text generation returned no output"));
        }
        debug!(output_chars = raw_output.len(), "Received model output");
        trace!(raw_output = %raw_output, "Raw model output");

        let report = extract_report(&raw_output).inspect_err(|e| {
            warn!("Extraction failed: {}", e.message);
        })?;

        info!("Analysis complete");
        Ok(report)
    }
}
