//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validation::{as_integer, check_field, Rule, ValidationErrors};

/// Longest accepted serial number, in characters
pub const SERIAL_NUMBER_MAX_LEN: usize = 20;

/// Syntactic serial number rules. Uniqueness and the type mask are checked
/// against the store once these pass.
pub const SERIAL_NUMBER_RULES: &[Rule] = &[
    Rule::Required,
    Rule::String,
    Rule::Max(SERIAL_NUMBER_MAX_LEN),
];

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub equipment_type_id: i32,
    pub serial_number: String,
    pub remark: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Set on soft delete; deleted rows are never returned
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create equipment request.
///
/// Fields are kept as raw JSON so every type mismatch is reported as a field
/// error instead of rejecting the whole body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateEquipment {
    #[schema(value_type = i32)]
    pub equipment_type_id: Option<Value>,
    /// A single serial number, or an array of them for bulk creation
    #[schema(value_type = Object)]
    pub serial_number: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub remark: Option<Value>,
}

/// Serial number input after disambiguation
#[derive(Debug, Clone, PartialEq)]
pub enum SerialNumberInput {
    Single(String),
    /// Elements are validated one by one, so they stay raw
    Batch(Vec<Value>),
}

/// Fields of a [`CreateEquipment`] that passed their syntactic rules
#[derive(Debug, Default)]
pub struct CreateFields {
    pub equipment_type_id: Option<i64>,
    pub serial_number: Option<SerialNumberInput>,
    pub remark: Option<String>,
}

impl CreateEquipment {
    /// Check every field and keep the values that passed
    pub fn parse(&self) -> (CreateFields, ValidationErrors) {
        let mut errors = ValidationErrors::new();
        let mut fields = CreateFields::default();

        let type_id = self.equipment_type_id.as_ref();
        let type_rules = &[Rule::Required, Rule::Integer];
        if check_field(&mut errors, "equipment_type_id", type_id, type_rules) {
            fields.equipment_type_id = type_id.and_then(as_integer);
        }

        let serial = self.serial_number.as_ref();
        let serial_rules = &[Rule::Required, Rule::StringOrArray];
        if check_field(&mut errors, "serial_number", serial, serial_rules) {
            fields.serial_number = match serial {
                Some(Value::String(s)) => Some(SerialNumberInput::Single(s.clone())),
                Some(Value::Array(items)) => Some(SerialNumberInput::Batch(items.clone())),
                _ => None,
            };
        }

        let remark = self.remark.as_ref();
        if check_field(&mut errors, "remark", remark, &[Rule::Nullable, Rule::String]) {
            fields.remark = remark.and_then(Value::as_str).map(str::to_string);
        }

        (fields, errors)
    }
}

/// Row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewEquipment {
    pub equipment_type_id: i32,
    pub serial_number: String,
    pub remark: Option<String>,
}

/// Update equipment request; absent fields stay unchanged, an explicit
/// `null` remark clears it
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEquipment {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub equipment_type_id: Option<Option<Value>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub serial_number: Option<Option<Value>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub remark: Option<Option<Value>>,
}

/// Fields of an [`UpdateEquipment`] that were supplied and passed their
/// syntactic rules
#[derive(Debug, Default)]
pub struct UpdateFields {
    pub equipment_type_id: Option<i64>,
    pub serial_number: Option<String>,
    pub remark: Option<Option<String>>,
}

fn supplied(field: &Option<Option<Value>>) -> Option<&Value> {
    field.as_ref().map(|value| value.as_ref().unwrap_or(&Value::Null))
}

impl UpdateEquipment {
    pub fn parse(&self) -> (UpdateFields, ValidationErrors) {
        let mut errors = ValidationErrors::new();
        let mut fields = UpdateFields::default();

        if let Some(value) = supplied(&self.equipment_type_id) {
            if check_field(&mut errors, "equipment_type_id", Some(value), &[Rule::Integer]) {
                fields.equipment_type_id = as_integer(value);
            }
        }

        if let Some(value) = supplied(&self.serial_number) {
            if check_field(&mut errors, "serial_number", Some(value), SERIAL_NUMBER_RULES) {
                fields.serial_number = value.as_str().map(str::to_string);
            }
        }

        if let Some(value) = supplied(&self.remark) {
            if check_field(&mut errors, "remark", Some(value), &[Rule::Nullable, Rule::String]) {
                fields.remark = Some(value.as_str().map(str::to_string));
            }
        }

        (fields, errors)
    }
}

/// Column changes for an update; `None` leaves a column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentChanges {
    pub equipment_type_id: Option<i32>,
    pub serial_number: Option<String>,
    pub remark: Option<Option<String>>,
}

impl EquipmentChanges {
    pub fn is_empty(&self) -> bool {
        self.equipment_type_id.is_none() && self.serial_number.is_none() && self.remark.is_none()
    }
}

/// Query parameters for equipment search
#[serde_as]
#[derive(Debug, Default, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EquipmentSearchQuery {
    /// Substring to look for in serial numbers
    #[validate(length(
        max = 20,
        message = "The serial number must not be greater than 20 characters."
    ))]
    pub serial_number: Option<String>,
    /// Page number (1-based, default: 1)
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub page: Option<i64>,
    /// Items per page (default: 30, capped at `pagination.max_per_page`, 100 by default)
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub per_page: Option<i64>,
}

/// Store-level filter for listing equipment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentFilter {
    /// Literal substring of the serial number
    pub serial_number: Option<String>,
}

/// Per-item outcome of a bulk create
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BulkItemOutcome {
    Created { id: i32 },
    Rejected { errors: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BulkItemResult {
    /// Position in the submitted `serial_number` array
    pub index: usize,
    #[serde(flatten)]
    pub outcome: BulkItemOutcome,
}

/// Result of a bulk create: which array positions were committed and which
/// were rejected
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct BulkCreateReport {
    pub results: Vec<BulkItemResult>,
}

impl BulkCreateReport {
    /// Field path of a batch element, e.g. `serial_number.2`
    pub fn field(index: usize) -> String {
        format!("serial_number.{}", index)
    }

    pub fn push_created(&mut self, index: usize, id: i32) {
        self.results.push(BulkItemResult {
            index,
            outcome: BulkItemOutcome::Created { id },
        });
    }

    pub fn push_rejected(&mut self, index: usize, errors: Vec<String>) {
        self.results.push(BulkItemResult {
            index,
            outcome: BulkItemOutcome::Rejected { errors },
        });
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn created_ids(&self) -> Vec<i32> {
        self.results
            .iter()
            .filter_map(|r| match r.outcome {
                BulkItemOutcome::Created { id } => Some(id),
                BulkItemOutcome::Rejected { .. } => None,
            })
            .collect()
    }

    pub fn rejected_count(&self) -> usize {
        self.len() - self.created_ids().len()
    }

    pub fn has_rejections(&self) -> bool {
        self.rejected_count() > 0
    }

    /// Rejections keyed by field path
    pub fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for result in &self.results {
            if let BulkItemOutcome::Rejected { errors: messages } = &result.outcome {
                for message in messages {
                    errors.add(Self::field(result.index), message.clone());
                }
            }
        }
        errors
    }
}
