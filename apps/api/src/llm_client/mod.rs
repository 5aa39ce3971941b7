//! LLM Client — the single point of entry for text generation in the CCN analyzer.
//!
//! ARCHITECTURAL RULE: No other module may talk to the model backend directly.
//! All generation goes through a `TextGenerator`, injected into `AppState`.
//!
//! Production backend: a local Ollama instance serving the note-review model.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Fixed seed used for deterministic decoding.
const DETERMINISTIC_SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend returned empty output")]
    EmptyOutput,
}

/// A text-generation backend. Implement this to swap backends without touching
/// the analysis service or the handlers.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a continuation for `prompt`, producing at most `max_new_tokens`
    /// tokens. With `deterministic`, decoding is greedy and reproducible.
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
        deterministic: bool,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl GenerateOptions {
    fn new(max_new_tokens: u32, deterministic: bool) -> Self {
        if deterministic {
            Self {
                num_predict: max_new_tokens,
                temperature: Some(0.0),
                top_k: Some(1),
                seed: Some(DETERMINISTIC_SEED),
            }
        } else {
            Self {
                num_predict: max_new_tokens,
                ..Self::default()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Ollama HTTP client for local model inference.
/// Makes exactly one attempt per call; the analysis flow has no retry policy.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists the models the backend currently has available.
    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), body));
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Returns true if the configured model is present in the backend.
    pub async fn is_model_available(&self) -> Result<bool, GenerationError> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| model_matches(m, &self.model)))
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
        deterministic: bool,
    ) -> Result<String, GenerationError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions::new(max_new_tokens, deterministic),
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), body));
        }

        let generated: GenerateResponse = response.json().await?;

        debug!(
            "Generation succeeded: prompt_tokens={:?}, output_tokens={:?}",
            generated.prompt_eval_count, generated.eval_count
        );

        if generated.response.trim().is_empty() {
            return Err(GenerationError::EmptyOutput);
        }

        Ok(generated.response)
    }
}

/// Builds an `Api` error, preferring the backend's own error message when the
/// body is an Ollama error object.
fn api_error(status: u16, body: String) -> GenerationError {
    let message = serde_json::from_str::<OllamaError>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    GenerationError::Api { status, message }
}

/// Ollama reports untagged models as `name:latest`.
fn model_matches(available: &str, wanted: &str) -> bool {
    available == wanted || (!wanted.contains(':') && available == format!("{wanted}:latest"))
}

/// Backend stub for tests: returns a canned reply or a canned failure and
/// records the last prompt it received.
#[cfg(test)]
pub struct StubGenerator {
    reply: Option<String>,
    pub last_prompt: std::sync::Mutex<Option<String>>,
    pub last_max_new_tokens: std::sync::Mutex<Option<u32>>,
}

#[cfg(test)]
impl StubGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            last_prompt: std::sync::Mutex::new(None),
            last_max_new_tokens: std::sync::Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            last_prompt: std::sync::Mutex::new(None),
            last_max_new_tokens: std::sync::Mutex::new(None),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
        _deterministic: bool,
    ) -> Result<String, GenerationError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_max_new_tokens.lock().unwrap() = Some(max_new_tokens);
        match &self.reply {
            Some(reply) if reply.is_empty() => Err(GenerationError::EmptyOutput),
            Some(reply) => Ok(reply.clone()),
            None => Err(GenerationError::Api {
                status: 503,
                message: "model not loaded".to_string(),
            }),
        }
    }
}
