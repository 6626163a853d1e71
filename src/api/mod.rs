//! API handlers for the equipment registry REST endpoints

pub mod equipment;
pub mod equipment_types;
pub mod health;
pub mod openapi;
pub mod resources;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Narrow a path id to the `i32` key space; ids outside it cannot exist
fn resource_id(id: i64, what: &str) -> AppResult<i32> {
    i32::try_from(id).map_err(|_| AppError::NotFound(format!("{} {} not found", what, id)))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route("/equipment/search", get(equipment::search_equipment))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .patch(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        // Equipment types
        .route("/equipment-types", get(equipment_types::list_equipment_types))
        .route("/equipment-types/:id", get(equipment_types::get_equipment_type))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
