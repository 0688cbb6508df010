//! The quantification pipeline: measured resolution first, generative
//! fallback second, then scaling and aggregation.
//!
//! Every query submitted ends up in exactly one of the aggregate's item
//! or failed lists; the pipeline itself never fails a request.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::estimator::NutrientEstimator;
use crate::meal::{build_aggregate, FoodQuery, MealAggregate};
use crate::metrics::{BATCH_SIZE, FOOD_RESOLUTIONS, QUANTIFY_DURATION};
use crate::source::SourceResolver;

/// Orchestrates the two resolution stages and the final aggregation.
pub struct MealPipeline {
    resolver: SourceResolver,
    estimator: Option<Arc<dyn NutrientEstimator>>,
}

impl MealPipeline {
    pub fn new(resolver: SourceResolver) -> Self {
        Self {
            resolver,
            estimator: None,
        }
    }

    /// Set the fallback estimator for foods the source cannot resolve.
    pub fn with_estimator(mut self, estimator: Arc<dyn NutrientEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Quantify one batch of food queries into a [`MealAggregate`].
    ///
    /// The source stage fans out over all queries; the fallback stage runs
    /// afterwards on the failure list only, as a single batched call.
    pub async fn quantify(&self, queries: &[FoodQuery]) -> MealAggregate {
        let start = Instant::now();
        BATCH_SIZE.with_label_values(&[]).observe(queries.len() as f64);

        let mut resolution = self.resolver.resolve_all(queries).await;

        debug!(
            resolved = resolution.resolved.len(),
            failed = resolution.failed.len(),
            "Source stage complete"
        );

        let failed = if resolution.failed.is_empty() {
            Vec::new()
        } else if let Some(estimator) = &self.estimator {
            info!(
                foods = resolution.failed.len(),
                "Falling back to nutrition estimation"
            );
            let estimation = estimator.estimate(&resolution.failed).await;
            resolution.resolved.extend(estimation.estimated);
            estimation.still_failed
        } else {
            std::mem::take(&mut resolution.failed)
        };

        for food in &resolution.resolved {
            FOOD_RESOLUTIONS
                .with_label_values(&[food.provenance.as_str()])
                .inc();
        }
        FOOD_RESOLUTIONS
            .with_label_values(&["failed"])
            .inc_by(failed.len() as u64);

        let aggregate = build_aggregate(&resolution.resolved, failed);

        QUANTIFY_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());

        info!(
            items = aggregate.items.len(),
            failed = aggregate.failed.len(),
            calories = aggregate.totals.calories,
            "Quantification complete"
        );

        aggregate
    }
}
