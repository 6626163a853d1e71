//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, equipment_types, health, resources};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment Registry API",
        version = "1.0.0",
        description = "Serial-numbered equipment inventory REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Equipment
        equipment::list_equipment,
        equipment::search_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Equipment types
        equipment_types::list_equipment_types,
        equipment_types::get_equipment_type,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::BulkCreateReport,
            crate::models::equipment::BulkItemResult,
            crate::models::equipment::BulkItemOutcome,
            crate::models::equipment_type::EquipmentType,
            // Envelopes
            resources::EquipmentResource,
            resources::EquipmentTypeResource,
            resources::EquipmentTypeList,
            resources::EquipmentCollection,
            resources::PageLinks,
            resources::PageMeta,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment management"),
        (name = "equipment-types", description = "Equipment types and serial number masks")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
