//! Equipment types service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::EquipmentType,
    repository::EquipmentTypeStore,
};

#[derive(Clone)]
pub struct EquipmentTypesService {
    store: Arc<dyn EquipmentTypeStore>,
}

impl EquipmentTypesService {
    pub fn new(store: Arc<dyn EquipmentTypeStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<EquipmentType> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment type {} not found", id)))
    }
}
