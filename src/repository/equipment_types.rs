//! Equipment types repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::EquipmentTypeStore;
use crate::{error::AppResult, models::EquipmentType};

#[derive(Clone)]
pub struct EquipmentTypesRepository {
    pool: Pool<Postgres>,
}

impl EquipmentTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentTypeStore for EquipmentTypesRepository {
    /// List all equipment types
    async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        let rows = sqlx::query_as::<_, EquipmentType>("SELECT * FROM equipment_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment type by ID
    async fn find(&self, id: i32) -> AppResult<Option<EquipmentType>> {
        let row = sqlx::query_as::<_, EquipmentType>("SELECT * FROM equipment_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
