//! Shared domain types for meal quantification.

use serde::{Deserialize, Serialize};

/// One food mention extracted from a meal description.
///
/// Immutable once created; both resolution paths consume it by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodQuery {
    /// Display name as the user wrote it (e.g. "pasta al pomodoro").
    pub name: String,
    /// Requested portion in grams. Always > 0.
    pub grams: f64,
    /// Term used for the nutrition source lookup.
    pub search_terms: String,
    /// Terms that should appear in a correct match name.
    #[serde(default)]
    pub include_hints: Vec<String>,
    /// Terms that disqualify a match.
    #[serde(default)]
    pub exclude_hints: Vec<String>,
}

impl FoodQuery {
    /// Convenience constructor that uses the name as the search term.
    pub fn new(name: impl Into<String>, grams: f64) -> Self {
        let name = name.into();
        Self {
            search_terms: name.clone(),
            name,
            grams,
            include_hints: Vec::new(),
            exclude_hints: Vec::new(),
        }
    }
}

/// Per-100g nutrient profile, source-agnostic.
///
/// Calories in kcal, sodium in mg, everything else in grams,
/// all per 100 g of the food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientValues {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub saturated_fat: f64,
    pub sodium: f64,
}

impl NutrientValues {
    /// Scale this per-100g profile to an absolute portion.
    pub fn scaled_to(&self, grams: f64) -> NutrientValues {
        let factor = grams / 100.0;
        NutrientValues {
            calories: self.calories * factor,
            protein: self.protein * factor,
            fat: self.fat * factor,
            carbohydrate: self.carbohydrate * factor,
            fiber: self.fiber * factor,
            sugar: self.sugar * factor,
            saturated_fat: self.saturated_fat * factor,
            sodium: self.sodium * factor,
        }
    }
}

/// Where a nutrient record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Looked up in the nutrition database.
    Measured,
    /// Estimated by the generative fallback.
    Estimated,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Measured => "measured",
            Provenance::Estimated => "estimated",
        }
    }
}

/// A query paired with its per-100g nutrients and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedFood {
    pub query: FoodQuery,
    pub nutrients: NutrientValues,
    pub provenance: Provenance,
}

/// A query both resolution paths gave up on. Terminal for this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFood {
    pub query: FoodQuery,
    pub reason: String,
}

/// Per-item absolute nutrients, scaled to the requested portion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub grams: f64,
    pub nutrients: NutrientValues,
    pub provenance: Provenance,
}

/// Meal-level macro totals, one-decimal rounded at the reporting edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MealTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
}

/// The complete output of one quantification request.
///
/// Built once per pipeline invocation and handed unmodified to
/// persistence and formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealAggregate {
    /// Per-item contributions, in resolution order.
    pub items: Vec<MealItem>,
    /// Queries neither resolution path could satisfy.
    pub failed: Vec<FailedFood>,
    pub totals: MealTotals,
}

/// Which meal of the day is being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(format!("Unknown meal type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_to_200g_doubles() {
        let per_100g = NutrientValues {
            calories: 150.0,
            protein: 5.0,
            fat: 2.0,
            carbohydrate: 28.0,
            ..Default::default()
        };

        let absolute = per_100g.scaled_to(200.0);
        assert_eq!(absolute.calories, 300.0);
        assert_eq!(absolute.protein, 10.0);
        assert_eq!(absolute.fat, 4.0);
        assert_eq!(absolute.carbohydrate, 56.0);
    }

    #[test]
    fn test_scaled_to_identity_at_100g() {
        let per_100g = NutrientValues {
            calories: 89.0,
            sugar: 12.2,
            ..Default::default()
        };
        let absolute = per_100g.scaled_to(100.0);
        assert_eq!(absolute, per_100g);
    }

    #[test]
    fn test_food_query_new_uses_name_as_search_terms() {
        let query = FoodQuery::new("banana", 120.0);
        assert_eq!(query.search_terms, "banana");
        assert_eq!(query.grams, 120.0);
        assert!(query.include_hints.is_empty());
    }

    #[test]
    fn test_provenance_serialization() {
        assert_eq!(
            serde_json::to_string(&Provenance::Measured).unwrap(),
            "\"measured\""
        );
        assert_eq!(
            serde_json::to_string(&Provenance::Estimated).unwrap(),
            "\"estimated\""
        );
    }

    #[test]
    fn test_meal_type_roundtrip() {
        for meal_type in [
            MealType::Breakfast,
            MealType::Lunch,
            MealType::Dinner,
            MealType::Snack,
        ] {
            let parsed: MealType = meal_type.as_str().parse().unwrap();
            assert_eq!(parsed, meal_type);
        }
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_food_query_deserialize_without_hints() {
        let json = r#"{"name":"rice","grams":80.0,"search_terms":"white rice cooked"}"#;
        let query: FoodQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.name, "rice");
        assert!(query.include_hints.is_empty());
        assert!(query.exclude_hints.is_empty());
    }
}
