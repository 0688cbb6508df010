//! Nutrition source: external food-database client, candidate scoring,
//! and per-query resolution into measured nutrient records.

mod fatsecret;
mod resolver;
mod scorer;
mod traits;
mod types;

pub use fatsecret::FatSecretClient;
pub use resolver::{Resolution, ResolveFailure, SourceResolver};
pub use scorer::{best_match, score_candidate};
pub use traits::NutritionSource;
pub use types::*;
