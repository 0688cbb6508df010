//! Persistence types for logged meals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::meal::{MealAggregate, MealTotals, MealType, Provenance};

/// Request to persist one quantified meal.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub created_by: String,
    pub meal_type: MealType,
    /// The raw description the user gave.
    pub description: String,
    pub aggregate: MealAggregate,
}

/// A stored meal with its per-item rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: String,
    pub created_by: String,
    pub logged_at: DateTime<Utc>,
    pub meal_type: MealType,
    pub description: String,
    pub totals: MealTotals,
    pub items: Vec<MealItemRecord>,
}

/// One stored food item belonging to a meal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealItemRecord {
    pub name: String,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub saturated_fat: f64,
    pub sodium: f64,
    pub provenance: Provenance,
}

/// Summed totals for one user and day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub meal_count: u32,
    pub totals: MealTotals,
}
