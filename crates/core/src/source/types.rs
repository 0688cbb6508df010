//! Shared types for nutrition source backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a nutrition source backend.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Json(String),

    #[error("Food id \"{0}\" does not exist")]
    MissingFood(String),
}

/// One entry returned by a food search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCandidate {
    pub id: String,
    pub name: String,
    /// Source-side category, e.g. "Generic" or "Brand".
    pub food_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One serving entry of a food's detail record.
///
/// Nutrient fields follow the database convention: calories in kcal,
/// sodium in mg, the rest in grams.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodServing {
    pub serving_description: String,
    pub metric_serving_amount: f64,
    pub metric_serving_unit: String,
    pub number_of_units: f64,
    pub measurement_description: String,
    pub calories: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub saturated_fat: f64,
    pub sodium: f64,
    pub fiber: f64,
    pub sugar: f64,
}

impl FoodServing {
    /// Whether this serving describes exactly 100 grams of the food.
    ///
    /// Either an explicit 100g metric serving or a serving literally
    /// described as "100 g". Anything else is rejected; the pipeline does
    /// not convert arbitrary serving units.
    pub fn is_per_100g(&self) -> bool {
        (self.number_of_units == 100.0 && self.measurement_description == "g")
            || self.serving_description == "100 g"
    }
}

/// Full detail record for one food id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDetails {
    pub id: String,
    pub name: String,
    pub food_type: String,
    pub servings: Vec<FoodServing>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_per_100g_metric_serving() {
        let serving = FoodServing {
            number_of_units: 100.0,
            measurement_description: "g".to_string(),
            ..Default::default()
        };
        assert!(serving.is_per_100g());
    }

    #[test]
    fn test_is_per_100g_by_description() {
        let serving = FoodServing {
            serving_description: "100 g".to_string(),
            number_of_units: 1.0,
            measurement_description: "serving".to_string(),
            ..Default::default()
        };
        assert!(serving.is_per_100g());
    }

    #[test]
    fn test_is_per_100g_rejects_other_servings() {
        let cup = FoodServing {
            serving_description: "1 cup".to_string(),
            number_of_units: 1.0,
            measurement_description: "cup".to_string(),
            ..Default::default()
        };
        assert!(!cup.is_per_100g());

        // 100 of something that isn't grams
        let ml = FoodServing {
            number_of_units: 100.0,
            measurement_description: "ml".to_string(),
            ..Default::default()
        };
        assert!(!ml.is_per_100g());
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: HTTP 503: unavailable");

        let err = SourceError::MissingFood("12345".to_string());
        assert!(err.to_string().contains("12345"));
    }
}
