//! Mock LLM client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Mock implementation of the [`LlmClient`] trait.
///
/// Returns a canned response (or a canned error) and records the prompts
/// it was asked to complete.
pub struct MockLlmClient {
    response: Arc<RwLock<String>>,
    error: Option<String>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockLlmClient {
    /// A client that answers every request with the given text.
    pub fn new(response: &str) -> Self {
        Self {
            response: Arc::new(RwLock::new(response.to_string())),
            error: None,
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A client whose every request fails with an API error.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Arc::new(RwLock::new(String::new())),
            error: Some(message.to_string()),
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Replace the canned response.
    pub async fn set_response(&self, response: &str) {
        *self.response.write().await = response.to_string();
    }

    /// User prompts seen so far, in call order.
    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.read().await.len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.write().await.push(request.prompt);

        if let Some(message) = &self.error {
            return Err(LlmError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        Ok(CompletionResponse {
            text: self.response.read().await.clone(),
            usage: LlmUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
        })
    }
}
