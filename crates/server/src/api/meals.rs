//! Meal logging API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use mealog_core::metrics::MEALS_LOGGED;
use mealog_core::{
    format_summary, DailySummary, ExtractError, FailedFood, MealItem, MealRecord, MealTotals,
    MealType, NewMeal, StoreError,
};

use super::middleware::AuthUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for logging a meal
#[derive(Debug, Deserialize)]
pub struct LogMealBody {
    /// Free-text meal description
    pub description: String,
    /// breakfast | lunch | dinner | snack
    pub meal_type: String,
}

/// Query parameters for listing meals and summaries
#[derive(Debug, Deserialize)]
pub struct DayParams {
    /// UTC date (YYYY-MM-DD); defaults to today
    pub date: Option<NaiveDate>,
}

/// Response for a logged meal
#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub id: String,
    pub meal_type: MealType,
    pub description: String,
    pub items: Vec<MealItem>,
    pub failed: Vec<FailedFood>,
    pub totals: MealTotals,
    /// Human-readable summary block
    pub summary: String,
}

/// Response for listing meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub date: NaiveDate,
    pub meals: Vec<MealRecord>,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Log a meal from a free-text description.
///
/// Extraction and persistence failures abort the request with a generic
/// message; per-food resolution failures are reported in the response
/// body, never as an error status.
pub async fn log_meal(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogMealBody>,
) -> Result<(StatusCode, Json<LogMealResponse>), ApiError> {
    let meal_type: MealType = body
        .meal_type
        .parse()
        .map_err(|_| api_error(StatusCode::UNPROCESSABLE_ENTITY, "Unknown meal type"))?;

    if body.description.trim().is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Description cannot be empty",
        ));
    }

    let Some(extractor) = state.extractor() else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Meal logging is not available",
        ));
    };

    let extraction = extractor.extract(&body.description).await.map_err(|e| {
        error!(error = %e, "Food extraction failed");
        match e {
            ExtractError::Empty => api_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "No food items recognized in the description",
            ),
            _ => api_error(
                StatusCode::BAD_GATEWAY,
                "Could not process the meal description",
            ),
        }
    })?;

    let aggregate = state.pipeline().quantify(&extraction.queries).await;
    let summary = format_summary(&aggregate, meal_type);

    let record = state
        .store()
        .create(NewMeal {
            created_by: user_id,
            meal_type,
            description: body.description,
            aggregate: aggregate.clone(),
        })
        .map_err(|e| {
            error!(error = %e, "Failed to persist meal");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not save the meal")
        })?;

    MEALS_LOGGED.inc();

    Ok((
        StatusCode::CREATED,
        Json(LogMealResponse {
            id: record.id,
            meal_type,
            description: record.description,
            items: aggregate.items,
            failed: aggregate.failed,
            totals: aggregate.totals,
            summary,
        }),
    ))
}

/// List the user's meals for one day.
pub async fn list_meals(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<DayParams>,
) -> Result<Json<ListMealsResponse>, ApiError> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let meals = state.store().list_for_day(&user_id, date).map_err(|e| {
        error!(error = %e, "Failed to list meals");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not load meals")
    })?;

    Ok(Json(ListMealsResponse { date, meals }))
}

/// Daily macro summary for one day.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<DayParams>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let summary = state.store().daily_summary(&user_id, date).map_err(|e| {
        error!(error = %e, "Failed to compute daily summary");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not load summary")
    })?;

    Ok(Json(summary))
}

/// Delete one of the user's meals.
pub async fn delete_meal(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.store().delete(&user_id, &meal_id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => {
            Err(api_error(StatusCode::NOT_FOUND, "Meal not found"))
        }
        Err(e) => {
            error!(error = %e, "Failed to delete meal");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not delete the meal",
            ))
        }
    }
}
