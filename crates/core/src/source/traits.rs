//! Trait seam for nutrition source backends.

use async_trait::async_trait;

use super::types::{FoodCandidate, FoodDetails, SourceError};

/// A searchable food database with per-food detail records.
///
/// Implementations own their credential lifecycle; callers never see
/// tokens. All calls are independent and safe to issue concurrently.
#[async_trait]
pub trait NutritionSource: Send + Sync {
    /// Backend name for logging and metrics.
    fn name(&self) -> &str;

    /// Search foods by free-text term.
    async fn search(&self, term: &str) -> Result<Vec<FoodCandidate>, SourceError>;

    /// Fetch the full serving data for one food id.
    async fn get_details(&self, food_id: &str) -> Result<FoodDetails, SourceError>;
}
