use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, meals, middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Health and metrics stay reachable without credentials
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics));

    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/meals", post(meals::log_meal))
        .route("/meals", get(meals::list_meals))
        .route("/meals/{id}", delete(meals::delete_meal))
        .route("/summary", get(meals::get_summary))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let api_routes = public_routes
        .merge(protected_routes)
        .layer(from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
