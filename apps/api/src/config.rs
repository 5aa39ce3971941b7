use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_url: String,
    pub model_name: String,
    pub max_new_tokens: u32,
    pub generation_timeout_secs: u64,
    pub max_concurrent_generations: usize,
    /// Request body limit in bytes; 0 disables the limit.
    pub max_body_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model_name: env_or("MODEL_NAME", "gemma:2b-instruct"),
            max_new_tokens: parse_env("MAX_NEW_TOKENS", 250)?,
            generation_timeout_secs: parse_env("GENERATION_TIMEOUT_SECS", 300)?,
            max_concurrent_generations: parse_env::<usize>("MAX_CONCURRENT_GENERATIONS", 1)?
                .max(1),
            max_body_bytes: parse_env("MAX_BODY_BYTES", 0)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
