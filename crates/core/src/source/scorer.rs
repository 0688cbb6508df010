//! Heuristic ranking of search candidates against a food query.
//!
//! No network access; works entirely on the candidate list returned by
//! the source. Generic foods are preferred over branded products, whose
//! nutrient data tends to be noisier.

use crate::meal::FoodQuery;

use super::types::FoodCandidate;

/// Baseline score every candidate starts from.
const BASE_SCORE: i32 = 10;
/// Bonus per include hint found in the candidate name.
const INCLUDE_BONUS: i32 = 2;
/// Penalty per exclude hint found in the candidate name.
const EXCLUDE_PENALTY: i32 = 3;
/// Bonus for the database's generic (non-branded) category.
const GENERIC_BONUS: i32 = 3;

/// Score a single candidate against the query's hints.
pub fn score_candidate(query: &FoodQuery, candidate: &FoodCandidate) -> i32 {
    let name = candidate.name.to_lowercase();
    let mut score = BASE_SCORE;

    for hint in &query.include_hints {
        if name.contains(&hint.to_lowercase()) {
            score += INCLUDE_BONUS;
        }
    }

    for hint in &query.exclude_hints {
        if name.contains(&hint.to_lowercase()) {
            score -= EXCLUDE_PENALTY;
        }
    }

    if candidate.food_type == "Generic" {
        score += GENERIC_BONUS;
    }

    score
}

/// Pick the best-scoring candidate.
///
/// Ties break to the candidate the source listed first: the running best
/// is only replaced on a strictly greater score, so the result is
/// deterministic for identical inputs.
pub fn best_match<'a>(
    query: &FoodQuery,
    candidates: &'a [FoodCandidate],
) -> Option<&'a FoodCandidate> {
    let mut best: Option<(&FoodCandidate, i32)> = None;

    for candidate in candidates {
        let score = score_candidate(query, candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(candidate, _)| candidate)
}
