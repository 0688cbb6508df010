//! Persistence of quantified meals.

mod sqlite;
mod traits;
mod types;

pub use sqlite::SqliteMealStore;
pub use traits::{MealStore, StoreError};
pub use types::*;
