//! Testing utilities and mock implementations.
//!
//! Mock implementations of the external-facing traits so the pipeline and
//! the server can be exercised end to end without real infrastructure.

mod mock_llm;
mod mock_source;

pub use mock_llm::MockLlmClient;
pub use mock_source::MockNutritionSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::source::{FoodCandidate, FoodDetails, FoodServing};

    /// Create a generic search candidate.
    pub fn generic_candidate(id: &str, name: &str) -> FoodCandidate {
        FoodCandidate {
            id: id.to_string(),
            name: name.to_string(),
            food_type: "Generic".to_string(),
            brand: None,
            description: None,
        }
    }

    /// Create a branded search candidate.
    pub fn branded_candidate(id: &str, name: &str, brand: &str) -> FoodCandidate {
        FoodCandidate {
            id: id.to_string(),
            name: name.to_string(),
            food_type: "Brand".to_string(),
            brand: Some(brand.to_string()),
            description: None,
        }
    }

    /// Create a proper 100g metric serving.
    pub fn serving_100g(calories: f64, protein: f64, fat: f64, carbohydrate: f64) -> FoodServing {
        FoodServing {
            serving_description: "100 g".to_string(),
            metric_serving_amount: 100.0,
            metric_serving_unit: "g".to_string(),
            number_of_units: 100.0,
            measurement_description: "g".to_string(),
            calories,
            protein,
            fat,
            carbohydrate,
            ..Default::default()
        }
    }

    /// Create a non-100g household serving.
    pub fn serving_cup(calories: f64) -> FoodServing {
        FoodServing {
            serving_description: "1 cup".to_string(),
            number_of_units: 1.0,
            measurement_description: "cup".to_string(),
            calories,
            ..Default::default()
        }
    }

    /// Create a detail record with the given servings.
    pub fn food_details(id: &str, name: &str, servings: Vec<FoodServing>) -> FoodDetails {
        FoodDetails {
            id: id.to_string(),
            name: name.to_string(),
            food_type: "Generic".to_string(),
            servings,
        }
    }
}
