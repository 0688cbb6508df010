use std::sync::Arc;

use mealog_core::{
    Authenticator, Config, FoodExtractor, MealPipeline, MealStore, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn MealStore>,
    pipeline: Arc<MealPipeline>,
    extractor: Option<Arc<dyn FoodExtractor>>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        store: Arc<dyn MealStore>,
        pipeline: Arc<MealPipeline>,
        extractor: Option<Arc<dyn FoodExtractor>>,
    ) -> Self {
        Self {
            config,
            authenticator,
            store,
            pipeline,
            extractor,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn store(&self) -> &dyn MealStore {
        self.store.as_ref()
    }

    pub fn pipeline(&self) -> &MealPipeline {
        &self.pipeline
    }

    pub fn extractor(&self) -> Option<&Arc<dyn FoodExtractor>> {
        self.extractor.as_ref()
    }
}
