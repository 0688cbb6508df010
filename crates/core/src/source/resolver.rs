//! Per-query resolution against the nutrition source.
//!
//! Turns each [`FoodQuery`] into either a measured [`ResolvedFood`] or a
//! [`FailedFood`] with a reason. Failures are data, never raised errors:
//! one food failing must not abort its siblings.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::meal::{FailedFood, FoodQuery, NutrientValues, Provenance, ResolvedFood};

use super::scorer::best_match;
use super::types::{FoodServing, SourceError};
use super::NutritionSource;

/// Why a single query could not be resolved from the source.
#[derive(Debug, Error)]
pub enum ResolveFailure {
    #[error("No results found for \"{0}\"")]
    NoResults(String),

    #[error("Food id \"{0}\" does not exist")]
    MissingFood(String),

    #[error("No 100g serving available for \"{0}\"")]
    NoStandardServing(String),

    #[error("Nutrition source is not available")]
    Unavailable,

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Outcome of resolving one batch: two disjoint lists whose lengths sum
/// to the input length.
#[derive(Debug, Default)]
pub struct Resolution {
    pub resolved: Vec<ResolvedFood>,
    pub failed: Vec<FailedFood>,
}

/// Resolves food queries against an optional nutrition source.
///
/// `None` models the unconfigured-credentials state: every query fails
/// fast with an unavailable reason and no network call is attempted, so
/// the whole batch routes to the fallback estimator.
pub struct SourceResolver {
    source: Option<Arc<dyn NutritionSource>>,
}

impl SourceResolver {
    pub fn new(source: Option<Arc<dyn NutritionSource>>) -> Self {
        Self { source }
    }

    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    /// Resolve all queries concurrently. Each query's search and detail
    /// fetch are sequential, but queries do not block each other.
    pub async fn resolve_all(&self, queries: &[FoodQuery]) -> Resolution {
        let Some(source) = &self.source else {
            debug!(
                queries = queries.len(),
                "Nutrition source unavailable, failing whole batch"
            );
            return Resolution {
                resolved: Vec::new(),
                failed: queries
                    .iter()
                    .map(|query| FailedFood {
                        query: query.clone(),
                        reason: ResolveFailure::Unavailable.to_string(),
                    })
                    .collect(),
            };
        };

        let outcomes = futures::future::join_all(
            queries
                .iter()
                .map(|query| async move { (query, resolve_one(source.as_ref(), query).await) }),
        )
        .await;

        let mut resolution = Resolution::default();
        for (query, outcome) in outcomes {
            match outcome {
                Ok(nutrients) => resolution.resolved.push(ResolvedFood {
                    query: query.clone(),
                    nutrients,
                    provenance: Provenance::Measured,
                }),
                Err(failure) => {
                    warn!(food = %query.name, error = %failure, "Source resolution failed");
                    resolution.failed.push(FailedFood {
                        query: query.clone(),
                        reason: failure.to_string(),
                    });
                }
            }
        }

        debug!(
            resolved = resolution.resolved.len(),
            failed = resolution.failed.len(),
            "Source resolution complete"
        );

        resolution
    }
}

/// Resolve one query: search, pick the best candidate, fetch details,
/// and keep only a true 100g serving.
async fn resolve_one(
    source: &dyn NutritionSource,
    query: &FoodQuery,
) -> Result<NutrientValues, ResolveFailure> {
    let candidates = source.search(&query.search_terms).await?;

    let best = best_match(query, &candidates)
        .ok_or_else(|| ResolveFailure::NoResults(query.search_terms.clone()))?;

    let details = source.get_details(&best.id).await.map_err(|e| match e {
        SourceError::MissingFood(id) => ResolveFailure::MissingFood(id),
        other => ResolveFailure::Source(other),
    })?;

    let serving = details
        .servings
        .iter()
        .find(|serving| serving.is_per_100g())
        .ok_or_else(|| ResolveFailure::NoStandardServing(details.name.clone()))?;

    Ok(nutrients_from_serving(serving))
}

fn nutrients_from_serving(serving: &FoodServing) -> NutrientValues {
    NutrientValues {
        calories: serving.calories,
        protein: serving.protein,
        fat: serving.fat,
        carbohydrate: serving.carbohydrate,
        fiber: serving.fiber,
        sugar: serving.sugar,
        saturated_fat: serving.saturated_fat,
        sodium: serving.sodium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::types::{FoodCandidate, FoodDetails};
    use crate::testing::MockNutritionSource;

    fn candidate(id: &str, name: &str) -> FoodCandidate {
        FoodCandidate {
            id: id.to_string(),
            name: name.to_string(),
            food_type: "Generic".to_string(),
            brand: None,
            description: None,
        }
    }

    fn per_100g_serving(calories: f64, protein: f64) -> FoodServing {
        FoodServing {
            serving_description: "100 g".to_string(),
            metric_serving_amount: 100.0,
            metric_serving_unit: "g".to_string(),
            number_of_units: 100.0,
            measurement_description: "g".to_string(),
            calories,
            protein,
            fat: 2.0,
            carbohydrate: 28.0,
            ..Default::default()
        }
    }

    fn cup_serving() -> FoodServing {
        FoodServing {
            serving_description: "1 cup".to_string(),
            number_of_units: 1.0,
            measurement_description: "cup".to_string(),
            calories: 220.0,
            ..Default::default()
        }
    }

    fn details(id: &str, name: &str, servings: Vec<FoodServing>) -> FoodDetails {
        FoodDetails {
            id: id.to_string(),
            name: name.to_string(),
            food_type: "Generic".to_string(),
            servings,
        }
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let source = MockNutritionSource::new();
        source
            .set_candidates(vec![candidate("1", "Pasta with Tomato Sauce")])
            .await;
        source
            .set_details("1", details("1", "Pasta with Tomato Sauce", vec![
                cup_serving(),
                per_100g_serving(150.0, 5.0),
            ]))
            .await;

        let resolver = SourceResolver::new(Some(Arc::new(source)));
        let queries = vec![FoodQuery::new("pasta al pomodoro", 200.0)];
        let resolution = resolver.resolve_all(&queries).await;

        assert_eq!(resolution.resolved.len(), 1);
        assert!(resolution.failed.is_empty());

        let food = &resolution.resolved[0];
        assert_eq!(food.provenance, Provenance::Measured);
        assert_eq!(food.nutrients.calories, 150.0);
        assert_eq!(food.nutrients.protein, 5.0);
    }

    #[tokio::test]
    async fn test_resolve_no_results() {
        let source = MockNutritionSource::new();
        let resolver = SourceResolver::new(Some(Arc::new(source)));

        let queries = vec![FoodQuery::new("unobtainium stew", 100.0)];
        let resolution = resolver.resolve_all(&queries).await;

        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.failed.len(), 1);
        assert!(resolution.failed[0].reason.contains("No results"));
    }

    #[tokio::test]
    async fn test_resolve_no_100g_serving() {
        let source = MockNutritionSource::new();
        source.set_candidates(vec![candidate("7", "Apple Pie")]).await;
        source
            .set_details("7", details("7", "Apple Pie", vec![cup_serving()]))
            .await;

        let resolver = SourceResolver::new(Some(Arc::new(source)));
        let resolution = resolver
            .resolve_all(&[FoodQuery::new("apple pie", 120.0)])
            .await;

        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.failed.len(), 1);
        assert!(resolution.failed[0].reason.contains("No 100g serving"));
    }

    #[tokio::test]
    async fn test_resolve_missing_details() {
        let source = MockNutritionSource::new();
        source.set_candidates(vec![candidate("404", "Ghost Food")]).await;
        // No details registered for id "404"

        let resolver = SourceResolver::new(Some(Arc::new(source)));
        let resolution = resolver
            .resolve_all(&[FoodQuery::new("ghost food", 50.0)])
            .await;

        assert_eq!(resolution.failed.len(), 1);
        assert!(resolution.failed[0].reason.contains("does not exist"));
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let source = MockNutritionSource::new();
        source
            .set_candidates_for("rice", vec![candidate("1", "Rice")])
            .await;
        source
            .set_details("1", details("1", "Rice", vec![per_100g_serving(130.0, 2.7)]))
            .await;
        // "mystery" has no candidates configured

        let resolver = SourceResolver::new(Some(Arc::new(source)));
        let queries = vec![
            FoodQuery::new("rice", 80.0),
            FoodQuery::new("mystery", 30.0),
        ];
        let resolution = resolver.resolve_all(&queries).await;

        assert_eq!(resolution.resolved.len(), 1);
        assert_eq!(resolution.failed.len(), 1);
        assert_eq!(resolution.resolved[0].query.name, "rice");
        assert_eq!(resolution.failed[0].query.name, "mystery");
    }

    #[tokio::test]
    async fn test_unavailable_source_fails_whole_batch_without_calls() {
        let resolver = SourceResolver::new(None);
        let queries = vec![
            FoodQuery::new("rice", 80.0),
            FoodQuery::new("beans", 120.0),
        ];

        let resolution = resolver.resolve_all(&queries).await;

        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.failed.len(), 2);
        for failed in &resolution.failed {
            assert!(failed.reason.contains("not available"));
            assert!(!failed.reason.contains("No results"));
        }
    }

    #[tokio::test]
    async fn test_count_invariant() {
        let source = MockNutritionSource::new();
        source
            .set_candidates_for("rice", vec![candidate("1", "Rice")])
            .await;
        source
            .set_details("1", details("1", "Rice", vec![per_100g_serving(130.0, 2.7)]))
            .await;

        let resolver = SourceResolver::new(Some(Arc::new(source)));
        let queries: Vec<FoodQuery> = vec![
            FoodQuery::new("rice", 80.0),
            FoodQuery::new("nothing-1", 10.0),
            FoodQuery::new("nothing-2", 20.0),
        ];

        let resolution = resolver.resolve_all(&queries).await;
        assert_eq!(
            resolution.resolved.len() + resolution.failed.len(),
            queries.len()
        );
    }
}
