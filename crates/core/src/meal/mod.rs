//! Meal domain model: queries, nutrient records, aggregation, formatting.

mod aggregate;
mod format;
mod types;

pub use aggregate::build_aggregate;
pub use format::format_summary;
pub use types::*;
