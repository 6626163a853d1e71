//! Equipment service
//!
//! Validates requests against the field rules and the store, then persists.
//! Bulk creation validates and inserts each serial number on its own: valid
//! rows are committed as they go, rejected ones are collected in a
//! [`BulkCreateReport`] and the call fails once every item was attempted.

use std::sync::Arc;

use serde_json::Value;
use validator::Validate;

use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
    models::{
        equipment::{
            CreateEquipment, EquipmentChanges, EquipmentFilter, EquipmentSearchQuery,
            SerialNumberInput, UpdateEquipment, SERIAL_NUMBER_RULES,
        },
        BulkCreateReport, Equipment, EquipmentType, NewEquipment, SerialMask,
    },
    pagination::{Page, PageQuery, PageRequest},
    repository::{EquipmentStore, EquipmentTypeStore},
    validation::{invalid_selection_message, run_rules, taken_message, ValidationErrors},
};

/// What a successful create produced
#[derive(Debug)]
pub enum CreatedEquipment {
    Single(Equipment),
    Batch(BulkCreateReport),
}

#[derive(Clone)]
pub struct EquipmentService {
    equipment: Arc<dyn EquipmentStore>,
    equipment_types: Arc<dyn EquipmentTypeStore>,
    pagination: PaginationConfig,
}

impl EquipmentService {
    pub fn new(
        equipment: Arc<dyn EquipmentStore>,
        equipment_types: Arc<dyn EquipmentTypeStore>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            equipment,
            equipment_types,
            pagination,
        }
    }

    /// List equipment, paginated
    pub async fn list(&self, query: &PageQuery) -> AppResult<Page<Equipment>> {
        let page = PageRequest::resolve(query.page, query.per_page, &self.pagination);
        let (items, total) = self.equipment.list(&EquipmentFilter::default(), page).await?;
        Ok(Page::new(items, total, page))
    }

    /// Search equipment by serial number substring, paginated
    pub async fn search(&self, query: &EquipmentSearchQuery) -> AppResult<Page<Equipment>> {
        query.validate()?;
        let filter = EquipmentFilter {
            serial_number: query.serial_number.clone().filter(|s| !s.is_empty()),
        };
        let page = PageRequest::resolve(query.page, query.per_page, &self.pagination);
        let (items, total) = self.equipment.list(&filter, page).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.equipment.get_by_id(id).await
    }

    /// Create one row from a serial number string, or one row per element of
    /// a serial number array
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<CreatedEquipment> {
        let (fields, mut errors) = data.parse();

        let equipment_type = match fields.equipment_type_id {
            Some(type_id) => {
                let found = self.find_type(type_id).await?;
                if found.is_none() {
                    errors.add("equipment_type_id", invalid_selection_message("equipment_type_id"));
                }
                found
            }
            None => None,
        };
        errors.into_result()?;

        let (Some(equipment_type), Some(serial_number)) = (equipment_type, fields.serial_number)
        else {
            return Err(AppError::Internal(
                "create request passed validation incomplete".to_string(),
            ));
        };
        let mask = mask_of(&equipment_type)?;
        let template = NewEquipment {
            equipment_type_id: equipment_type.id,
            serial_number: String::new(),
            remark: fields.remark,
        };

        match serial_number {
            SerialNumberInput::Single(serial) => {
                let value = Value::String(serial);
                match self.create_one("serial_number", &value, &mask, &template).await? {
                    Ok(equipment) => {
                        tracing::info!(
                            "Created equipment {} ({})",
                            equipment.id,
                            equipment.serial_number
                        );
                        Ok(CreatedEquipment::Single(equipment))
                    }
                    Err(message) => Err(ValidationErrors::single("serial_number", message).into()),
                }
            }
            SerialNumberInput::Batch(items) => self.create_batch(&items, &mask, &template).await,
        }
    }

    async fn create_batch(
        &self,
        items: &[Value],
        mask: &SerialMask,
        template: &NewEquipment,
    ) -> AppResult<CreatedEquipment> {
        let mut report = BulkCreateReport::default();

        for (index, value) in items.iter().enumerate() {
            let field = BulkCreateReport::field(index);
            let outcome = match self.create_one(&field, value, mask, template).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        "Bulk equipment create aborted at index {} after {} row(s) created: {}",
                        index,
                        report.created_ids().len(),
                        e
                    );
                    return Err(e);
                }
            };
            match outcome {
                Ok(equipment) => report.push_created(index, equipment.id),
                Err(message) => report.push_rejected(index, vec![message]),
            }
        }

        if report.has_rejections() {
            tracing::warn!(
                "Bulk equipment create: {} created, {} rejected",
                report.len() - report.rejected_count(),
                report.rejected_count()
            );
            return Err(AppError::BatchRejected(report));
        }

        tracing::info!("Bulk equipment create: {} created", report.len());
        Ok(CreatedEquipment::Batch(report))
    }

    /// Validate one serial number and insert it. The inner `Err` is the
    /// failure message for `field`; the outer one a store failure.
    async fn create_one(
        &self,
        field: &str,
        value: &Value,
        mask: &SerialMask,
        template: &NewEquipment,
    ) -> AppResult<Result<Equipment, String>> {
        if let Err(message) = run_rules(field, value, SERIAL_NUMBER_RULES) {
            return Ok(Err(message));
        }
        let serial = value.as_str().unwrap_or_default();
        if let Some(message) = self.serial_number_failure(field, serial, Some(mask), None).await? {
            return Ok(Err(message));
        }

        let data = NewEquipment {
            serial_number: serial.to_string(),
            ..template.clone()
        };
        match self.equipment.create(&data).await {
            Ok(equipment) => Ok(Ok(equipment)),
            // lost the race against a concurrent insert
            Err(AppError::Conflict(_)) => Ok(Err(taken_message(field))),
            Err(e) => Err(e),
        }
    }

    /// Update the supplied fields of an existing row
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let current = self.equipment.get_by_id(id).await?;
        let (fields, mut errors) = data.parse();

        // Type whose mask the stored serial number must match afterwards
        let target_type = match fields.equipment_type_id {
            Some(type_id) => {
                let found = self.find_type(type_id).await?;
                if found.is_none() {
                    errors.add("equipment_type_id", invalid_selection_message("equipment_type_id"));
                }
                found
            }
            None if errors.contains("equipment_type_id") => None,
            None => self.find_type(current.equipment_type_id.into()).await?,
        };
        let mask = target_type.as_ref().map(mask_of).transpose()?;
        let type_changed = target_type
            .as_ref()
            .is_some_and(|t| t.id != current.equipment_type_id);

        if let Some(serial) = fields.serial_number.as_deref() {
            if let Some(message) = self
                .serial_number_failure("serial_number", serial, mask.as_ref(), Some(id))
                .await?
            {
                errors.add("serial_number", message);
            }
        } else if type_changed && !errors.contains("serial_number") {
            if let Some(mask) = &mask {
                if !mask.matches(&current.serial_number) {
                    errors.add("serial_number", mask.mismatch_message("serial_number"));
                }
            }
        }
        errors.into_result()?;

        let changes = EquipmentChanges {
            equipment_type_id: fields
                .equipment_type_id
                .and(target_type.as_ref().map(|t| t.id)),
            serial_number: fields.serial_number,
            remark: fields.remark,
        };
        if changes.is_empty() {
            return Ok(current);
        }

        match self.equipment.update(id, &changes).await {
            Ok(equipment) => {
                tracing::info!("Updated equipment {}", id);
                Ok(equipment)
            }
            Err(AppError::Conflict(_)) => {
                let message = taken_message("serial_number");
                Err(ValidationErrors::single("serial_number", message).into())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.equipment.delete(id).await?;
        tracing::info!("Deleted equipment {}", id);
        Ok(())
    }

    /// Store-backed serial number rules, in order: unique among live rows
    /// (ignoring `ignore_id`), then the equipment type mask.
    async fn serial_number_failure(
        &self,
        field: &str,
        serial: &str,
        mask: Option<&SerialMask>,
        ignore_id: Option<i32>,
    ) -> AppResult<Option<String>> {
        if self.equipment.serial_number_taken(serial, ignore_id).await? {
            return Ok(Some(taken_message(field)));
        }
        Ok(mask
            .filter(|mask| !mask.matches(serial))
            .map(|mask| mask.mismatch_message(field)))
    }

    async fn find_type(&self, id: i64) -> AppResult<Option<EquipmentType>> {
        match i32::try_from(id) {
            Ok(id) => self.equipment_types.find(id).await,
            Err(_) => Ok(None),
        }
    }
}

fn mask_of(equipment_type: &EquipmentType) -> AppResult<SerialMask> {
    equipment_type.serial_mask().map_err(|e| {
        AppError::Internal(format!(
            "Invalid serial number mask for equipment type {}: {}",
            equipment_type.id, e
        ))
    })
}
