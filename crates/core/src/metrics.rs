//! Prometheus metrics for core components.
//!
//! The server crate owns the registry; this module only defines the
//! collectors and exposes them for registration.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Food resolutions by final outcome.
pub static FOOD_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mealog_food_resolutions_total", "Food query resolutions"),
        &["outcome"], // "measured", "estimated", "failed"
    )
    .unwrap()
});

/// End-to-end quantification duration per request.
pub static QUANTIFY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mealog_quantify_duration_seconds",
            "Duration of one quantification request",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &[],
    )
    .unwrap()
});

/// Queries per quantification batch.
pub static BATCH_SIZE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mealog_batch_size",
            "Number of food queries per quantification request",
        )
        .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 12.0, 20.0]),
        &[],
    )
    .unwrap()
});

/// Meals written to the store.
pub static MEALS_LOGGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("mealog_meals_logged_total", "Total meals persisted").unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mealog_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Search results returned per source query.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mealog_search_results",
            "Number of candidates returned per source search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &[],
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mealog_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FOOD_RESOLUTIONS.clone()),
        Box::new(QUANTIFY_DURATION.clone()),
        Box::new(BATCH_SIZE.clone()),
        Box::new(MEALS_LOGGED.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }

    #[test]
    fn test_counters_usable() {
        FOOD_RESOLUTIONS.with_label_values(&["measured"]).inc();
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["fatsecret", "search", "success"])
            .inc();
        LLM_TOKENS.with_label_values(&["anthropic", "input"]).inc_by(10);
        BATCH_SIZE.with_label_values(&[]).observe(3.0);
    }
}
