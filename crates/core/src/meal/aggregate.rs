//! Scaling of per-100g records and folding into meal totals.

use super::types::{FailedFood, MealAggregate, MealItem, MealTotals, ResolvedFood};

/// Round to one decimal place for external reporting.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convert resolved foods into absolute per-item nutrients and fold them
/// into one [`MealAggregate`].
///
/// Totals are summed over the unrounded absolute values and rounded only
/// at the end, so per-item rounding error does not compound. The failed
/// list is carried through unmodified.
pub fn build_aggregate(resolved: &[ResolvedFood], failed: Vec<FailedFood>) -> MealAggregate {
    let items: Vec<MealItem> = resolved
        .iter()
        .map(|food| MealItem {
            name: food.query.name.clone(),
            grams: food.query.grams,
            nutrients: food.nutrients.scaled_to(food.query.grams),
            provenance: food.provenance,
        })
        .collect();

    let mut totals = MealTotals::default();
    for item in &items {
        totals.calories += item.nutrients.calories;
        totals.protein += item.nutrients.protein;
        totals.fat += item.nutrients.fat;
        totals.carbohydrate += item.nutrients.carbohydrate;
    }

    totals.calories = round1(totals.calories);
    totals.protein = round1(totals.protein);
    totals.fat = round1(totals.fat);
    totals.carbohydrate = round1(totals.carbohydrate);

    MealAggregate {
        items,
        failed,
        totals,
    }
}
