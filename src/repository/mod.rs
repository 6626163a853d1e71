//! Repository layer for database operations

pub mod equipment;
pub mod equipment_types;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentChanges, EquipmentFilter},
        Equipment, EquipmentType, NewEquipment,
    },
    pagination::PageRequest,
};

/// Persistence of equipment rows. Soft-deleted rows are invisible to every method.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// One page of rows matching `filter` in id order, with the total match count
    async fn list(
        &self,
        filter: &EquipmentFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Equipment>, i64)>;

    async fn get_by_id(&self, id: i32) -> AppResult<Equipment>;

    /// Whether another live row already uses `serial_number`
    async fn serial_number_taken(
        &self,
        serial_number: &str,
        ignore_id: Option<i32>,
    ) -> AppResult<bool>;

    /// Fails with [`AppError::Conflict`] when the serial number is taken
    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment>;

    /// Fails with [`AppError::Conflict`] when the serial number is taken
    async fn update(&self, id: i32, changes: &EquipmentChanges) -> AppResult<Equipment>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Read access to equipment types
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentTypeStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<EquipmentType>>;

    async fn find(&self, id: i32) -> AppResult<Option<EquipmentType>>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub equipment_types: equipment_types::EquipmentTypesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            equipment_types: equipment_types::EquipmentTypesRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Turn unique violations into [`AppError::Conflict`], pass anything else through
fn map_unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(what()),
        _ => AppError::Database(err),
    }
}
