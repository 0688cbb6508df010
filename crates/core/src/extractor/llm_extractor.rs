//! LLM-backed food-mention extractor.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm::{CompletionRequest, LlmClient};
use crate::meal::FoodQuery;
use crate::metrics::EXTERNAL_SERVICE_REQUESTS;

use super::{ExtractError, Extraction, FoodExtractor};

const SYSTEM_PROMPT: &str = "You are a nutrition assistant. Extract every distinct food item from the meal description.
Return a JSON object with the following structure:
{
  \"items\": [
    {
      \"name\": \"food name as the user wrote it\",
      \"grams\": number (estimated portion in grams; estimate from context when not stated),
      \"search\": \"short English search term for a food database\",
      \"include\": [\"terms a correct database match name should contain\"],
      \"exclude\": [\"terms that indicate a wrong match\"]
    }
  ]
}

Keep the search term generic (e.g. \"pasta tomato sauce\" rather than a
full sentence). Use include/exclude terms to disambiguate preparation
(grilled vs fried) or variants. Always return at least one item for a
description that mentions food.";

/// Extracts food mentions by prompting a generative model for strict JSON.
pub struct LlmFoodExtractor<C: LlmClient> {
    client: Arc<C>,
    max_tokens: u32,
}

impl<C: LlmClient> LlmFoodExtractor<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            max_tokens: 1024,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    items: Vec<ExtractedItem>,
}

#[derive(Debug, Deserialize)]
struct ExtractedItem {
    name: String,
    grams: f64,
    search: Option<String>,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[async_trait]
impl<C: LlmClient + 'static> FoodExtractor for LlmFoodExtractor<C> {
    async fn extract(&self, description: &str) -> Result<Extraction, ExtractError> {
        debug!(description = description, "Extracting food mentions");

        let request = CompletionRequest::new(format!("Meal description: {}", description))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens);

        let result = self
            .client
            .complete_json::<ExtractionResponse>(request)
            .await;

        let status = if result.is_ok() { "success" } else { "error" };
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["llm", "extract", status])
            .inc();

        let (response, usage) = result.map_err(|e| match e {
            crate::llm::LlmError::Json(msg) => ExtractError::Parse(msg),
            other => ExtractError::Llm(other.to_string()),
        })?;

        let queries: Vec<FoodQuery> = response
            .items
            .into_iter()
            .filter_map(|item| {
                if item.grams <= 0.0 {
                    warn!(food = %item.name, grams = item.grams, "Dropping item with non-positive portion");
                    return None;
                }
                Some(FoodQuery {
                    search_terms: item.search.unwrap_or_else(|| item.name.clone()),
                    name: item.name,
                    grams: item.grams,
                    include_hints: item.include,
                    exclude_hints: item.exclude,
                })
            })
            .collect();

        if queries.is_empty() {
            return Err(ExtractError::Empty);
        }

        debug!(items = queries.len(), "Extraction complete");

        Ok(Extraction {
            queries,
            usage: Some(usage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlmClient;

    #[tokio::test]
    async fn test_extract_maps_items_to_queries() {
        let response = r#"{
            "items": [
                {"name": "pasta al pomodoro", "grams": 200,
                 "search": "pasta tomato sauce",
                 "include": ["tomato"], "exclude": ["pesto"]},
                {"name": "insalata mista", "grams": 100, "search": "mixed salad"}
            ]
        }"#;
        let client = Arc::new(MockLlmClient::new(response));
        let extractor = LlmFoodExtractor::new(client);

        let extraction = extractor
            .extract("pasta al pomodoro 200g e insalata mista")
            .await
            .unwrap();

        assert_eq!(extraction.queries.len(), 2);
        let pasta = &extraction.queries[0];
        assert_eq!(pasta.name, "pasta al pomodoro");
        assert_eq!(pasta.grams, 200.0);
        assert_eq!(pasta.search_terms, "pasta tomato sauce");
        assert_eq!(pasta.include_hints, vec!["tomato"]);
        assert_eq!(pasta.exclude_hints, vec!["pesto"]);
    }

    #[tokio::test]
    async fn test_extract_defaults_search_to_name() {
        let response = r#"{"items": [{"name": "banana", "grams": 120}]}"#;
        let client = Arc::new(MockLlmClient::new(response));
        let extractor = LlmFoodExtractor::new(client);

        let extraction = extractor.extract("a banana").await.unwrap();
        assert_eq!(extraction.queries[0].search_terms, "banana");
    }

    #[tokio::test]
    async fn test_extract_drops_non_positive_portions() {
        let response = r#"{
            "items": [
                {"name": "water", "grams": 0},
                {"name": "bread", "grams": 50}
            ]
        }"#;
        let client = Arc::new(MockLlmClient::new(response));
        let extractor = LlmFoodExtractor::new(client);

        let extraction = extractor.extract("water and bread").await.unwrap();
        assert_eq!(extraction.queries.len(), 1);
        assert_eq!(extraction.queries[0].name, "bread");
    }

    #[tokio::test]
    async fn test_extract_empty_items_is_an_error() {
        let client = Arc::new(MockLlmClient::new(r#"{"items": []}"#));
        let extractor = LlmFoodExtractor::new(client);

        let result = extractor.extract("nothing edible here").await;
        assert!(matches!(result, Err(ExtractError::Empty)));
    }

    #[tokio::test]
    async fn test_extract_parse_failure() {
        let client = Arc::new(MockLlmClient::new("sorry, I can't do that"));
        let extractor = LlmFoodExtractor::new(client);

        let result = extractor.extract("pasta").await;
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }

    #[tokio::test]
    async fn test_extract_llm_failure() {
        let client = Arc::new(MockLlmClient::failing("overloaded"));
        let extractor = LlmFoodExtractor::new(client);

        let result = extractor.extract("pasta").await;
        assert!(matches!(result, Err(ExtractError::Llm(_))));
    }
}
