pub mod auth;
pub mod config;
pub mod estimator;
pub mod extractor;
pub mod llm;
pub mod meal;
pub mod metrics;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod testing;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    FatSecretConfig, LlmConfig, LlmProvider, SanitizedConfig,
};
pub use estimator::{Estimation, EstimatorConfig, LlmEstimator, NutrientEstimator};
pub use extractor::{ExtractError, Extraction, FoodExtractor, LlmFoodExtractor};
pub use llm::{AnthropicClient, CompletionRequest, LlmClient, LlmError, LlmUsage, OllamaClient};
pub use meal::{
    build_aggregate, format_summary, FailedFood, FoodQuery, MealAggregate, MealItem, MealTotals,
    MealType, NutrientValues, Provenance, ResolvedFood,
};
pub use pipeline::MealPipeline;
pub use source::{
    FatSecretClient, FoodCandidate, FoodDetails, FoodServing, NutritionSource, Resolution,
    ResolveFailure, SourceError, SourceResolver,
};
pub use store::{
    DailySummary, MealItemRecord, MealRecord, MealStore, NewMeal, SqliteMealStore, StoreError,
};
