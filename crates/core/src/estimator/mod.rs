//! Generative fallback for foods the nutrition source could not resolve.
//!
//! One batched model call per request, never one per food. The model is
//! asked for values strictly per 100 grams so the output shape matches
//! the measured path and the same scaling applies downstream.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{CompletionRequest, LlmClient, LlmUsage};
use crate::meal::{FailedFood, NutrientValues, Provenance, ResolvedFood};
use crate::metrics::EXTERNAL_SERVICE_REQUESTS;

const SYSTEM_PROMPT: &str = "You are a nutrition expert. Estimate the nutritional values for the given foods PER 100 GRAMS.
Return a JSON object with the following structure:
{
  \"items\": [
    {
      \"name\": \"food name\",
      \"calories\": number (kcal per 100g),
      \"protein\": number (grams per 100g),
      \"fat\": number (grams per 100g),
      \"carbohydrate\": number (grams per 100g),
      \"fiber\": number (grams per 100g),
      \"sugar\": number (grams per 100g),
      \"saturated_fat\": number (grams per 100g),
      \"sodium\": number (mg per 100g)
    }
  ]
}

Return one item per requested food, in the same order. Be accurate and use
standard nutritional reference values. If uncertain, provide conservative
estimates based on similar foods.
IMPORTANT: Always return values PER 100 GRAMS, regardless of the actual portion size mentioned.";

/// Outcome of one estimation batch. Disjoint lists; together they cover
/// every input food.
#[derive(Debug, Default)]
pub struct Estimation {
    pub estimated: Vec<ResolvedFood>,
    pub still_failed: Vec<FailedFood>,
    pub usage: Option<LlmUsage>,
}

/// Estimates per-100g nutrients for foods that failed source resolution.
///
/// Infallible by contract: any model or parse failure returns the input
/// unchanged as still-failed instead of raising.
#[async_trait]
pub trait NutrientEstimator: Send + Sync {
    async fn estimate(&self, failed: &[FailedFood]) -> Estimation;
}

/// Configuration for the LLM-backed estimator.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.3,
        }
    }
}

/// LLM-backed implementation of [`NutrientEstimator`].
pub struct LlmEstimator<C: LlmClient> {
    client: Arc<C>,
    config: EstimatorConfig,
}

impl<C: LlmClient> LlmEstimator<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            config: EstimatorConfig::default(),
        }
    }

    pub fn with_config(client: Arc<C>, config: EstimatorConfig) -> Self {
        Self { client, config }
    }

    fn build_user_prompt(failed: &[FailedFood]) -> String {
        // Grams are only a size hint for the model; the values come back
        // per 100g either way.
        let food_list: Vec<String> = failed
            .iter()
            .map(|f| format!("{} ({}g)", f.query.name, f.query.grams))
            .collect();
        format!(
            "Estimate nutrition for these foods (per 100g): {}",
            food_list.join(", ")
        )
    }

    /// Map estimates back onto the failed foods by index.
    ///
    /// The batch is all-or-nothing: a missing estimate for any index means
    /// the alignment cannot be trusted, so nothing from the batch is used.
    fn align(
        failed: &[FailedFood],
        items: Vec<EstimateWire>,
    ) -> Result<Vec<ResolvedFood>, EstimateProblem> {
        if items.len() < failed.len() {
            return Err(EstimateProblem::Incomplete {
                expected: failed.len(),
                got: items.len(),
            });
        }

        Ok(failed
            .iter()
            .zip(items)
            .map(|(food, estimate)| ResolvedFood {
                query: food.query.clone(),
                nutrients: NutrientValues {
                    calories: estimate.calories,
                    protein: estimate.protein,
                    fat: estimate.fat,
                    carbohydrate: estimate.carbohydrate,
                    fiber: estimate.fiber,
                    sugar: estimate.sugar,
                    saturated_fat: estimate.saturated_fat,
                    sodium: estimate.sodium,
                },
                provenance: Provenance::Estimated,
            })
            .collect())
    }
}

#[derive(Debug)]
enum EstimateProblem {
    Incomplete { expected: usize, got: usize },
}

impl std::fmt::Display for EstimateProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateProblem::Incomplete { expected, got } => {
                write!(f, "expected {} estimates, got {}", expected, got)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    items: Vec<EstimateWire>,
}

#[derive(Debug, Deserialize)]
struct EstimateWire {
    #[allow(dead_code)]
    name: Option<String>,
    #[serde(default)]
    calories: f64,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    fat: f64,
    #[serde(default)]
    carbohydrate: f64,
    #[serde(default)]
    fiber: f64,
    #[serde(default)]
    sugar: f64,
    #[serde(default)]
    saturated_fat: f64,
    #[serde(default)]
    sodium: f64,
}

#[async_trait]
impl<C: LlmClient + 'static> NutrientEstimator for LlmEstimator<C> {
    async fn estimate(&self, failed: &[FailedFood]) -> Estimation {
        if failed.is_empty() {
            return Estimation::default();
        }

        let request = CompletionRequest::new(Self::build_user_prompt(failed))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        let result = self
            .client
            .complete_json::<EstimateResponse>(request)
            .await;

        let status = if result.is_ok() { "success" } else { "error" };
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["llm", "estimate", status])
            .inc();

        let (response, usage) = match result {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, foods = failed.len(), "Nutrition estimation call failed");
                return Estimation {
                    estimated: Vec::new(),
                    still_failed: failed.to_vec(),
                    usage: None,
                };
            }
        };

        match Self::align(failed, response.items) {
            Ok(estimated) => {
                info!(foods = estimated.len(), "Nutrition estimation successful");
                Estimation {
                    estimated,
                    still_failed: Vec::new(),
                    usage: Some(usage),
                }
            }
            Err(problem) => {
                warn!(error = %problem, "Estimation batch misaligned, discarding");
                Estimation {
                    estimated: Vec::new(),
                    still_failed: failed.to_vec(),
                    usage: Some(usage),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meal::FoodQuery;
    use crate::testing::MockLlmClient;

    fn failed(name: &str, grams: f64) -> FailedFood {
        FailedFood {
            query: FoodQuery::new(name, grams),
            reason: "No results".to_string(),
        }
    }

    fn estimate_json(count: usize) -> String {
        let items: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"name": "food {}", "calories": 100.0, "protein": 10.0,
                        "fat": 5.0, "carbohydrate": 20.0, "fiber": 1.0,
                        "sugar": 2.0, "saturated_fat": 1.5, "sodium": 50.0}}"#,
                    i
                )
            })
            .collect();
        format!(r#"{{"items": [{}]}}"#, items.join(","))
    }

    #[tokio::test]
    async fn test_estimate_success() {
        let client = Arc::new(MockLlmClient::new(&estimate_json(2)));
        let estimator = LlmEstimator::new(client);

        let inputs = vec![failed("homemade soup", 300.0), failed("protein bar", 60.0)];
        let outcome = estimator.estimate(&inputs).await;

        assert_eq!(outcome.estimated.len(), 2);
        assert!(outcome.still_failed.is_empty());
        for food in &outcome.estimated {
            assert_eq!(food.provenance, Provenance::Estimated);
            assert_eq!(food.nutrients.calories, 100.0);
        }
        // Original queries retained
        assert_eq!(outcome.estimated[0].query.name, "homemade soup");
        assert_eq!(outcome.estimated[1].query.grams, 60.0);
    }

    #[tokio::test]
    async fn test_short_batch_fails_everything() {
        // 2 estimates for 3 foods: alignment cannot be trusted
        let client = Arc::new(MockLlmClient::new(&estimate_json(2)));
        let estimator = LlmEstimator::new(client);

        let inputs = vec![failed("a", 10.0), failed("b", 20.0), failed("c", 30.0)];
        let outcome = estimator.estimate(&inputs).await;

        assert!(outcome.estimated.is_empty());
        assert_eq!(outcome.still_failed.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_response_fails_everything() {
        let client = Arc::new(MockLlmClient::new("this is not json at all"));
        let estimator = LlmEstimator::new(client);

        let inputs = vec![failed("a", 10.0)];
        let outcome = estimator.estimate(&inputs).await;

        assert!(outcome.estimated.is_empty());
        assert_eq!(outcome.still_failed.len(), 1);
        assert_eq!(outcome.still_failed[0].query.name, "a");
    }

    #[tokio::test]
    async fn test_llm_error_fails_everything() {
        let client = Arc::new(MockLlmClient::failing("rate limited"));
        let estimator = LlmEstimator::new(client);

        let inputs = vec![failed("a", 10.0), failed("b", 20.0)];
        let outcome = estimator.estimate(&inputs).await;

        assert!(outcome.estimated.is_empty());
        assert_eq!(outcome.still_failed.len(), 2);
        assert!(outcome.usage.is_none());
    }

    #[tokio::test]
    async fn test_empty_input_skips_the_call() {
        let client = Arc::new(MockLlmClient::new("{}"));
        let estimator = LlmEstimator::new(client.clone());

        let outcome = estimator.estimate(&[]).await;

        assert!(outcome.estimated.is_empty());
        assert!(outcome.still_failed.is_empty());
        assert_eq!(client.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_prompt_renders_name_and_grams() {
        let client = Arc::new(MockLlmClient::new(&estimate_json(1)));
        let estimator = LlmEstimator::new(client.clone());

        estimator.estimate(&[failed("homemade soup", 300.0)]).await;

        let prompts = client.recorded_prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("homemade soup (300g)"));
        assert!(prompts[0].contains("per 100g"));
    }
}
