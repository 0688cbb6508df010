//! User-facing rendering of a quantified meal.

use super::types::{MealAggregate, MealType};

const DISCLAIMER: &str =
    "Note: these are approximate nutritional estimates and may differ from actual values.";

fn meal_heading(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "Breakfast",
        MealType::Lunch => "Lunch",
        MealType::Dinner => "Dinner",
        MealType::Snack => "Snack",
    }
}

/// Render a [`MealAggregate`] as a human-readable summary block.
///
/// Pure transformation; no network or persistence access.
pub fn format_summary(aggregate: &MealAggregate, meal_type: MealType) -> String {
    let mut out = String::new();

    out.push_str(&format!("Meal: {}\n\n", meal_heading(meal_type)));

    if !aggregate.items.is_empty() {
        out.push_str("Recognized:\n");
        for item in &aggregate.items {
            out.push_str(&format!(
                "- {} ({:.1}g): {:.1} kcal\n",
                item.name, item.grams, item.nutrients.calories
            ));
        }
    }

    if !aggregate.failed.is_empty() {
        out.push_str("\nCould not quantify the following items:\n");
        for failed in &aggregate.failed {
            out.push_str(&format!(
                "- {} ({:.0} g)\n",
                failed.query.name, failed.query.grams
            ));
        }
    }

    out.push_str(&format!(
        "\nSummary:\nCalories: {} kcal\nProtein: {} g\nFat: {} g\nCarbohydrates: {} g\n\n{}",
        aggregate.totals.calories,
        aggregate.totals.protein,
        aggregate.totals.fat,
        aggregate.totals.carbohydrate,
        DISCLAIMER
    ));

    out
}
