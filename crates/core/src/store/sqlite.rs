//! SQLite-backed meal store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::meal::{MealTotals, MealType, Provenance};

use super::traits::{MealStore, StoreError};
use super::types::{DailySummary, MealItemRecord, MealRecord, NewMeal};

/// SQLite-backed meal store.
pub struct SqliteMealStore {
    conn: Mutex<Connection>,
}

impl SqliteMealStore {
    /// Open (or create) the database file and bootstrap the schema.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meals (
                id TEXT PRIMARY KEY,
                created_by TEXT NOT NULL,
                logged_at TEXT NOT NULL,
                meal_type TEXT NOT NULL,
                description TEXT NOT NULL,
                total_calories REAL NOT NULL,
                total_protein REAL NOT NULL,
                total_fat REAL NOT NULL,
                total_carbohydrate REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meal_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                meal_id TEXT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                grams REAL NOT NULL,
                calories REAL NOT NULL,
                protein REAL NOT NULL,
                fat REAL NOT NULL,
                carbohydrate REAL NOT NULL,
                fiber REAL NOT NULL,
                sugar REAL NOT NULL,
                saturated_fat REAL NOT NULL,
                sodium REAL NOT NULL,
                provenance TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_meals_created_by ON meals(created_by);
            CREATE INDEX IF NOT EXISTS idx_meals_logged_at ON meals(logged_at);
            CREATE INDEX IF NOT EXISTS idx_meal_items_meal_id ON meal_items(meal_id);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Day boundaries as RFC 3339 strings for range queries.
    fn day_bounds(date: NaiveDate) -> (String, String) {
        let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = start + chrono::Duration::days(1);
        (start.to_rfc3339(), end.to_rfc3339())
    }

    fn row_to_meal(row: &rusqlite::Row) -> rusqlite::Result<MealRecord> {
        let id: String = row.get(0)?;
        let created_by: String = row.get(1)?;
        let logged_at_str: String = row.get(2)?;
        let meal_type_str: String = row.get(3)?;
        let description: String = row.get(4)?;

        let logged_at = DateTime::parse_from_rfc3339(&logged_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let meal_type: MealType = meal_type_str.parse().unwrap_or(MealType::Snack);

        Ok(MealRecord {
            id,
            created_by,
            logged_at,
            meal_type,
            description,
            totals: MealTotals {
                calories: row.get(5)?,
                protein: row.get(6)?,
                fat: row.get(7)?,
                carbohydrate: row.get(8)?,
            },
            items: Vec::new(),
        })
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<MealItemRecord> {
        let provenance_str: String = row.get(10)?;
        Ok(MealItemRecord {
            name: row.get(0)?,
            grams: row.get(1)?,
            calories: row.get(2)?,
            protein: row.get(3)?,
            fat: row.get(4)?,
            carbohydrate: row.get(5)?,
            fiber: row.get(6)?,
            sugar: row.get(7)?,
            saturated_fat: row.get(8)?,
            sodium: row.get(9)?,
            provenance: if provenance_str == "estimated" {
                Provenance::Estimated
            } else {
                Provenance::Measured
            },
        })
    }

    fn load_items(conn: &Connection, meal_id: &str) -> Result<Vec<MealItemRecord>, StoreError> {
        let mut stmt = conn
            .prepare(
                "SELECT name, grams, calories, protein, fat, carbohydrate,
                        fiber, sugar, saturated_fat, sodium, provenance
                 FROM meal_items WHERE meal_id = ? ORDER BY id",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let items = stmt
            .query_map(params![meal_id], Self::row_to_item)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(items)
    }
}

impl MealStore for SqliteMealStore {
    fn create(&self, meal: NewMeal) -> Result<MealRecord, StoreError> {
        let mut conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let logged_at = Utc::now();
        let totals = meal.aggregate.totals;

        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO meals (id, created_by, logged_at, meal_type, description,
                                total_calories, total_protein, total_fat, total_carbohydrate)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                meal.created_by,
                logged_at.to_rfc3339(),
                meal.meal_type.as_str(),
                meal.description,
                totals.calories,
                totals.protein,
                totals.fat,
                totals.carbohydrate,
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut items = Vec::with_capacity(meal.aggregate.items.len());
        for item in &meal.aggregate.items {
            tx.execute(
                "INSERT INTO meal_items (meal_id, name, grams, calories, protein, fat,
                                         carbohydrate, fiber, sugar, saturated_fat,
                                         sodium, provenance)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    id,
                    item.name,
                    item.grams,
                    item.nutrients.calories,
                    item.nutrients.protein,
                    item.nutrients.fat,
                    item.nutrients.carbohydrate,
                    item.nutrients.fiber,
                    item.nutrients.sugar,
                    item.nutrients.saturated_fat,
                    item.nutrients.sodium,
                    item.provenance.as_str(),
                ],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

            items.push(MealItemRecord {
                name: item.name.clone(),
                grams: item.grams,
                calories: item.nutrients.calories,
                protein: item.nutrients.protein,
                fat: item.nutrients.fat,
                carbohydrate: item.nutrients.carbohydrate,
                fiber: item.nutrients.fiber,
                sugar: item.nutrients.sugar,
                saturated_fat: item.nutrients.saturated_fat,
                sodium: item.nutrients.sodium,
                provenance: item.provenance,
            });
        }

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(MealRecord {
            id,
            created_by: meal.created_by,
            logged_at,
            meal_type: meal.meal_type,
            description: meal.description,
            totals,
            items,
        })
    }

    fn list_for_day(
        &self,
        created_by: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let (start, end) = Self::day_bounds(date);

        let mut stmt = conn
            .prepare(
                "SELECT id, created_by, logged_at, meal_type, description,
                        total_calories, total_protein, total_fat, total_carbohydrate
                 FROM meals
                 WHERE created_by = ? AND logged_at >= ? AND logged_at < ?
                 ORDER BY logged_at",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut meals = stmt
            .query_map(params![created_by, start, end], Self::row_to_meal)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for meal in &mut meals {
            meal.items = Self::load_items(&conn, &meal.id)?;
        }

        Ok(meals)
    }

    fn daily_summary(
        &self,
        created_by: &str,
        date: NaiveDate,
    ) -> Result<DailySummary, StoreError> {
        let conn = self.conn.lock().unwrap();
        let (start, end) = Self::day_bounds(date);

        conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(total_calories), 0),
                    COALESCE(SUM(total_protein), 0),
                    COALESCE(SUM(total_fat), 0),
                    COALESCE(SUM(total_carbohydrate), 0)
             FROM meals
             WHERE created_by = ? AND logged_at >= ? AND logged_at < ?",
            params![created_by, start, end],
            |row| {
                Ok(DailySummary {
                    date,
                    meal_count: row.get(0)?,
                    totals: MealTotals {
                        calories: row.get(1)?,
                        protein: row.get(2)?,
                        fat: row.get(3)?,
                        carbohydrate: row.get(4)?,
                    },
                })
            },
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn delete(&self, created_by: &str, meal_id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let deleted = conn
            .execute(
                "DELETE FROM meals WHERE id = ? AND created_by = ?",
                params![meal_id, created_by],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if deleted == 0 {
            return Err(StoreError::NotFound(meal_id.to_string()));
        }

        // CASCADE needs the foreign_keys pragma enabled per connection, so
        // delete the items explicitly instead of relying on it.
        conn.execute("DELETE FROM meal_items WHERE meal_id = ?", params![meal_id])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
