//! Mock nutrition source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{FoodCandidate, FoodDetails, NutritionSource, SourceError};

/// Mock implementation of the [`NutritionSource`] trait.
///
/// Controllable behavior for tests:
/// - default candidates for any term, or per-term candidate lists
/// - detail records keyed by food id
/// - a one-shot injected error
/// - recorded search terms for assertions
pub struct MockNutritionSource {
    default_candidates: Arc<RwLock<Vec<FoodCandidate>>>,
    candidates_by_term: Arc<RwLock<HashMap<String, Vec<FoodCandidate>>>>,
    details: Arc<RwLock<HashMap<String, FoodDetails>>>,
    next_error: Arc<RwLock<Option<SourceError>>>,
    searches: Arc<RwLock<Vec<String>>>,
}

impl Default for MockNutritionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNutritionSource {
    /// Create a mock that returns no candidates and knows no foods.
    pub fn new() -> Self {
        Self {
            default_candidates: Arc::new(RwLock::new(Vec::new())),
            candidates_by_term: Arc::new(RwLock::new(HashMap::new())),
            details: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            searches: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Candidates returned for any search term without a specific entry.
    pub async fn set_candidates(&self, candidates: Vec<FoodCandidate>) {
        *self.default_candidates.write().await = candidates;
    }

    /// Candidates returned for one exact search term.
    pub async fn set_candidates_for(&self, term: &str, candidates: Vec<FoodCandidate>) {
        self.candidates_by_term
            .write()
            .await
            .insert(term.to_string(), candidates);
    }

    /// Register the detail record for a food id.
    pub async fn set_details(&self, food_id: &str, details: FoodDetails) {
        self.details
            .write()
            .await
            .insert(food_id.to_string(), details);
    }

    /// Fail the next search with this error.
    pub async fn set_next_error(&self, error: SourceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Search terms seen so far, in call order.
    pub async fn recorded_searches(&self) -> Vec<String> {
        self.searches.read().await.clone()
    }
}

#[async_trait]
impl NutritionSource for MockNutritionSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, term: &str) -> Result<Vec<FoodCandidate>, SourceError> {
        self.searches.write().await.push(term.to_string());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(candidates) = self.candidates_by_term.read().await.get(term) {
            return Ok(candidates.clone());
        }

        Ok(self.default_candidates.read().await.clone())
    }

    async fn get_details(&self, food_id: &str) -> Result<FoodDetails, SourceError> {
        self.details
            .read()
            .await
            .get(food_id)
            .cloned()
            .ok_or_else(|| SourceError::MissingFood(food_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> FoodCandidate {
        FoodCandidate {
            id: id.to_string(),
            name: "Test Food".to_string(),
            food_type: "Generic".to_string(),
            brand: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_per_term_overrides_default() {
        let mock = MockNutritionSource::new();
        mock.set_candidates(vec![candidate("default")]).await;
        mock.set_candidates_for("special", vec![candidate("special")])
            .await;

        assert_eq!(mock.search("anything").await.unwrap()[0].id, "default");
        assert_eq!(mock.search("special").await.unwrap()[0].id, "special");
    }

    #[tokio::test]
    async fn test_next_error_is_one_shot() {
        let mock = MockNutritionSource::new();
        mock.set_next_error(SourceError::Http("boom".to_string()))
            .await;

        assert!(mock.search("a").await.is_err());
        assert!(mock.search("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_records_searches() {
        let mock = MockNutritionSource::new();
        mock.search("rice").await.unwrap();
        mock.search("beans").await.unwrap();

        assert_eq!(mock.recorded_searches().await, vec!["rice", "beans"]);
    }

    #[tokio::test]
    async fn test_unknown_id_is_missing_food() {
        let mock = MockNutritionSource::new();
        let result = mock.get_details("404").await;
        assert!(matches!(result, Err(SourceError::MissingFood(_))));
    }
}
