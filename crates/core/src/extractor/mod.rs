//! Extraction of structured food mentions from free-text descriptions.

mod llm_extractor;

pub use llm_extractor::LlmFoodExtractor;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::LlmUsage;
use crate::meal::FoodQuery;

/// Errors from food-mention extraction.
///
/// Unlike per-item resolution failures these are request-level: the
/// caller aborts the whole operation.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Extraction model call failed: {0}")]
    Llm(String),

    #[error("Failed to parse extraction response: {0}")]
    Parse(String),

    #[error("No food items found in the description")]
    Empty,
}

/// Result of one extraction call.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub queries: Vec<FoodQuery>,
    pub usage: Option<LlmUsage>,
}

/// Turns a raw meal description into a list of [`FoodQuery`] items.
#[async_trait]
pub trait FoodExtractor: Send + Sync {
    async fn extract(&self, description: &str) -> Result<Extraction, ExtractError>;
}
