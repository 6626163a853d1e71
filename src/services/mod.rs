//! Business logic services

pub mod equipment;
pub mod equipment_types;

use std::sync::Arc;

use crate::{
    config::PaginationConfig,
    repository::{EquipmentStore, EquipmentTypeStore, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub equipment_types: equipment_types::EquipmentTypesService,
}

impl Services {
    /// Create all services backed by the PostgreSQL repository
    pub fn new(repository: Repository, pagination: PaginationConfig) -> Self {
        Self::from_stores(
            Arc::new(repository.equipment),
            Arc::new(repository.equipment_types),
            pagination,
        )
    }

    /// Create all services over arbitrary stores
    pub fn from_stores(
        equipment: Arc<dyn EquipmentStore>,
        equipment_types: Arc<dyn EquipmentTypeStore>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            equipment: equipment::EquipmentService::new(
                equipment,
                equipment_types.clone(),
                pagination,
            ),
            equipment_types: equipment_types::EquipmentTypesService::new(equipment_types),
        }
    }
}
