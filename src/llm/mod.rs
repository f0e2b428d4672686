use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, LlmProvider};

pub mod gemini;
pub mod openai_compat;

/// Token usage information from an LLM response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// Completion text plus token usage when the provider reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// A prompt-in, text-out completion backend
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single prompt and return the model's completion
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Model identifier used for requests
    fn model(&self) -> &str;
}

/// Stand-in used when no backend could be configured; every call fails
pub struct UnavailableClient {
    model: String,
    reason: String,
}

impl UnavailableClient {
    pub fn new(model: String, reason: String) -> Self {
        Self { model, reason }
    }
}

#[async_trait]
impl LlmClient for UnavailableClient {
    async fn generate(&self, _prompt: &str) -> Result<LlmResponse> {
        anyhow::bail!("LLM backend not configured: {}", self.reason)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Build a reqwest client bounded by the configured timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Create the provider-specific LLM client described by the configuration
pub fn create_client(config: &Config) -> Result<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(config.llm.timeout_secs);

    match config.llm.provider {
        LlmProvider::Gemini => {
            let api_key = config
                .api_key()
                .context("Gemini API key not set. Set GEMINI_API_KEY or configure llm.api_key")?;
            tracing::info!("Using Gemini model {}", config.llm.model);
            Ok(Arc::new(gemini::GeminiClient::new(
                api_key,
                config.llm.model.clone(),
                config.llm.max_tokens,
                config.llm.base_url.clone(),
                timeout,
            )?))
        }
        LlmProvider::OpenAI => {
            let api_key = config
                .api_key()
                .context("OpenAI API key not set. Set OPENAI_API_KEY or configure llm.api_key")?;
            tracing::info!("Using OpenAI model {}", config.llm.model);
            Ok(Arc::new(openai_compat::OpenAiCompatClient::new(
                config
                    .llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| openai_compat::OPENAI_BASE_URL.to_string()),
                Some(api_key),
                config.llm.model.clone(),
                config.llm.max_tokens,
                timeout,
            )?))
        }
        LlmProvider::Ollama => {
            tracing::info!("Using Ollama (local LLM) model {}", config.llm.model);
            Ok(Arc::new(openai_compat::OpenAiCompatClient::new(
                config
                    .llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| openai_compat::OLLAMA_BASE_URL.to_string()),
                config.api_key(),
                config.llm.model.clone(),
                config.llm.max_tokens,
                timeout,
            )?))
        }
    }
}
