//! Equipment API endpoints

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, EquipmentSearchQuery, UpdateEquipment},
        Equipment,
    },
    pagination::PageQuery,
    services::equipment::CreatedEquipment,
};

use super::{
    resource_id,
    resources::{Resource, ResourceCollection},
};

/// List equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated equipment list", body = crate::api::resources::EquipmentCollection)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> AppResult<Json<ResourceCollection<Equipment>>> {
    let page = state.services.equipment.list(&query).await?;
    Ok(Json(ResourceCollection::from_page(page, &uri)))
}

/// Search equipment by serial number substring
#[utoipa::path(
    get,
    path = "/equipment/search",
    tag = "equipment",
    params(EquipmentSearchQuery),
    responses(
        (status = 200, description = "Paginated matching equipment", body = crate::api::resources::EquipmentCollection),
        (status = 422, description = "Invalid search term", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_equipment(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    WithRejection(Query(query), _): WithRejection<Query<EquipmentSearchQuery>, AppError>,
) -> AppResult<Json<ResourceCollection<Equipment>>> {
    let page = state.services.equipment.search(&query).await?;
    Ok(Json(ResourceCollection::from_page(page, &uri)))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = crate::api::resources::EquipmentResource),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Resource<Equipment>>> {
    let id = resource_id(id, "Equipment")?;
    let equipment = state.services.equipment.get_by_id(id).await?;
    Ok(Json(Resource::new(equipment)))
}

/// Create equipment.
///
/// `serial_number` may be a string (one row) or an array of strings (one row
/// per element). In bulk mode valid elements are created even when others are
/// rejected; the 422 response lists the outcome of every element.
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    request_body = CreateEquipment,
    responses(
        (
            status = 201,
            description = "Equipment created; an array of serial numbers answers with a `BulkCreateReport` instead",
            body = crate::api::resources::EquipmentResource
        ),
        (
            status = 422,
            description = "Validation failed; for arrays, `results` shows the rows that were created",
            body = crate::error::ErrorResponse
        )
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    WithRejection(Json(data), _): WithRejection<Json<CreateEquipment>, AppError>,
) -> AppResult<Response> {
    let created = state.services.equipment.create(&data).await?;
    Ok(match created {
        CreatedEquipment::Single(equipment) => {
            (StatusCode::CREATED, Json(Resource::new(equipment))).into_response()
        }
        CreatedEquipment::Batch(report) => (StatusCode::CREATED, Json(report)).into_response(),
    })
}

/// Update equipment; only supplied fields change
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = crate::api::resources::EquipmentResource),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(data), _): WithRejection<Json<UpdateEquipment>, AppError>,
) -> AppResult<Json<Resource<Equipment>>> {
    let id = resource_id(id, "Equipment")?;
    let equipment = state.services.equipment.update(id, &data).await?;
    Ok(Json(Resource::new(equipment)))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    let id = resource_id(id, "Equipment")?;
    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
