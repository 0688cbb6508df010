//! Trait seam for meal persistence.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::{DailySummary, MealRecord, NewMeal};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Meal not found: {0}")]
    NotFound(String),
}

/// Storage for quantified meals.
///
/// Synchronous by design; SQLite calls are short and the server wraps
/// them at the handler boundary.
pub trait MealStore: Send + Sync {
    /// Persist a meal and its items. Failed foods are report-only and are
    /// not stored.
    fn create(&self, meal: NewMeal) -> Result<MealRecord, StoreError>;

    /// All meals one user logged on one (UTC) day, oldest first.
    fn list_for_day(&self, created_by: &str, date: NaiveDate)
        -> Result<Vec<MealRecord>, StoreError>;

    /// Summed totals for one user and day.
    fn daily_summary(&self, created_by: &str, date: NaiveDate)
        -> Result<DailySummary, StoreError>;

    /// Delete one meal owned by the user.
    fn delete(&self, created_by: &str, meal_id: &str) -> Result<(), StoreError>;
}
