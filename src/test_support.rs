//! In-memory stores for service and router tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    config::{AppConfig, PaginationConfig},
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentChanges, EquipmentFilter},
        Equipment, EquipmentType, NewEquipment,
    },
    pagination::PageRequest,
    repository::{EquipmentStore, EquipmentTypeStore},
    services::Services,
    AppState,
};

/// Mask of [`DIR_300`]: digit, 2x upper/digit, 2x upper, upper/digit,
/// one of -_@, upper/digit, 2x lower
pub const DIR_300_MASK: &str = "NXXAAXZXaa";
pub const DIR_300: i32 = 1;
/// Five upper-case letters or digits
pub const GENERIC: i32 = 2;

/// Mirrors the PostgreSQL schema: id order, soft delete and a unique
/// serial number among live rows.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    rows: Vec<Equipment>,
    types: Vec<EquipmentType>,
    next_id: i32,
}

impl StoreState {
    fn live(&self) -> impl Iterator<Item = &Equipment> {
        self.rows.iter().filter(|r| r.deleted_at.is_none())
    }

    fn taken(&self, serial_number: &str, ignore_id: Option<i32>) -> bool {
        self.live()
            .any(|r| r.serial_number == serial_number && Some(r.id) != ignore_id)
    }
}

impl InMemoryStore {
    /// Store seeded with the [`DIR_300`] and [`GENERIC`] equipment types
    pub fn with_types() -> Arc<Self> {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            state.types.push(equipment_type(DIR_300, "D-Link DIR-300", DIR_300_MASK));
            state.types.push(equipment_type(GENERIC, "Generic", "XXXXX"));
        }
        Arc::new(store)
    }

    /// Insert a row without any validation
    pub fn seed(&self, equipment_type_id: i32, serial_number: &str) -> Equipment {
        let mut state = self.state.lock().unwrap();
        insert(&mut state, equipment_type_id, serial_number.to_string(), None)
    }

    /// Live rows in id order
    pub fn rows(&self) -> Vec<Equipment> {
        self.state.lock().unwrap().live().cloned().collect()
    }
}

pub fn equipment_type(id: i32, name: &str, mask: &str) -> EquipmentType {
    EquipmentType {
        id,
        name: name.to_string(),
        mask: mask.to_string(),
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

fn insert(
    state: &mut StoreState,
    equipment_type_id: i32,
    serial_number: String,
    remark: Option<String>,
) -> Equipment {
    state.next_id += 1;
    let now = Utc::now();
    let row = Equipment {
        id: state.next_id,
        equipment_type_id,
        serial_number,
        remark,
        created_at: Some(now),
        updated_at: Some(now),
        deleted_at: None,
    };
    state.rows.push(row.clone());
    row
}

#[async_trait]
impl EquipmentStore for InMemoryStore {
    async fn list(
        &self,
        filter: &EquipmentFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Equipment>, i64)> {
        let state = self.state.lock().unwrap();
        let matching: Vec<&Equipment> = state
            .live()
            .filter(|r| match &filter.serial_number {
                Some(term) => r.serial_number.contains(term.as_str()),
                None => true,
            })
            .collect();
        let total = matching.len() as i64;
        let rows = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok((rows, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.state
            .lock()
            .unwrap()
            .live()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn serial_number_taken(
        &self,
        serial_number: &str,
        ignore_id: Option<i32>,
    ) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().taken(serial_number, ignore_id))
    }

    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let mut state = self.state.lock().unwrap();
        if state.taken(&data.serial_number, None) {
            return Err(AppError::Conflict(format!(
                "Serial number {} already exists",
                data.serial_number
            )));
        }
        Ok(insert(
            &mut state,
            data.equipment_type_id,
            data.serial_number.clone(),
            data.remark.clone(),
        ))
    }

    async fn update(&self, id: i32, changes: &EquipmentChanges) -> AppResult<Equipment> {
        let mut state = self.state.lock().unwrap();
        if let Some(serial) = &changes.serial_number {
            if state.taken(serial, Some(id)) {
                return Err(AppError::Conflict(format!("Serial number {} already exists", serial)));
            }
        }
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;
        if let Some(type_id) = changes.equipment_type_id {
            row.equipment_type_id = type_id;
        }
        if let Some(serial) = &changes.serial_number {
            row.serial_number = serial.clone();
        }
        if let Some(remark) = &changes.remark {
            row.remark = remark.clone();
        }
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl EquipmentTypeStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        Ok(self.state.lock().unwrap().types.clone())
    }

    async fn find(&self, id: i32) -> AppResult<Option<EquipmentType>> {
        Ok(self.state.lock().unwrap().types.iter().find(|t| t.id == id).cloned())
    }
}

pub fn services(store: Arc<InMemoryStore>) -> Services {
    Services::from_stores(store.clone(), store, PaginationConfig::default())
}

pub fn app_state(store: Arc<InMemoryStore>) -> AppState {
    AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(services(store)),
    }
}
