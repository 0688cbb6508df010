//! Generative model clients.
//!
//! One trait, multiple backends. The extractor and the fallback estimator
//! both talk to whichever backend the configuration selects.

mod anthropic;
mod ollama;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmUsage {
    pub fn add(&mut self, other: &LlmUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Instructions for the model.
    pub system: Option<String>,
    /// User message.
    pub prompt: String,
    pub max_tokens: u32,
    /// 0.0 = deterministic.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: LlmUsage,
    pub model: String,
}

/// Trait for LLM backends.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g. "anthropic", "ollama").
    fn provider(&self) -> &str;

    /// Model name.
    fn model(&self) -> &str;

    /// Send a completion request and get the text response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Complete and parse the response as JSON, tolerating prose around
    /// the JSON object.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        request: CompletionRequest,
    ) -> Result<(T, LlmUsage), LlmError> {
        let response = self.complete(request).await?;
        let json = extract_json(&response.text);
        let parsed: T = serde_json::from_str(json)
            .map_err(|e| LlmError::Json(format!("{}: {}", e, response.text)))?;
        Ok((parsed, response.usage))
    }
}

/// Trim any prose surrounding the first top-level JSON object.
///
/// Models occasionally wrap their JSON in explanation or code fences even
/// when told not to; everything outside the outermost braces is dropped.
pub fn extract_json(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}
