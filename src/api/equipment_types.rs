//! Equipment type API endpoints (read-only)

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::EquipmentType,
};

use super::{resource_id, resources::Resource};

/// List equipment types with their serial number masks
#[utoipa::path(
    get,
    path = "/equipment-types",
    tag = "equipment-types",
    responses(
        (status = 200, description = "All equipment types", body = crate::api::resources::EquipmentTypeList)
    )
)]
pub async fn list_equipment_types(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Resource<Vec<EquipmentType>>>> {
    let types = state.services.equipment_types.list().await?;
    Ok(Json(Resource::new(types)))
}

/// Get equipment type by ID
#[utoipa::path(
    get,
    path = "/equipment-types/{id}",
    tag = "equipment-types",
    params(("id" = i64, Path, description = "Equipment type ID")),
    responses(
        (status = 200, description = "Equipment type details", body = crate::api::resources::EquipmentTypeResource),
        (status = 404, description = "Equipment type not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment_type(
    State(state): State<crate::AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Resource<EquipmentType>>> {
    let id = resource_id(id, "Equipment type")?;
    let equipment_type = state.services.equipment_types.get_by_id(id).await?;
    Ok(Json(Resource::new(equipment_type)))
}
