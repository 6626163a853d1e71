//! Equipment type model and serial number masks

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Equipment type record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentType {
    pub id: i32,
    pub name: String,
    /// Serial number mask (N=digit, A=upper, a=lower, X=upper or digit, Z=one of -_@)
    pub mask: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EquipmentType {
    pub fn serial_mask(&self) -> Result<SerialMask, regex::Error> {
        SerialMask::compile(&self.mask)
    }
}

/// Compiled serial number mask.
///
/// Every serial number character is matched against the mask character at the
/// same position, and the lengths must be equal.
#[derive(Debug, Clone)]
pub struct SerialMask {
    mask: String,
    pattern: Regex,
}

impl SerialMask {
    pub fn compile(mask: &str) -> Result<Self, regex::Error> {
        let mut pattern = String::with_capacity(mask.len() * 8 + 2);
        pattern.push('^');
        for c in mask.chars() {
            match c {
                'N' => pattern.push_str("[0-9]"),
                'A' => pattern.push_str("[A-Z]"),
                'a' => pattern.push_str("[a-z]"),
                'X' => pattern.push_str("[A-Z0-9]"),
                'Z' => pattern.push_str("[-_@]"),
                other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        pattern.push('$');
        Ok(Self {
            mask: mask.to_string(),
            pattern: Regex::new(&pattern)?,
        })
    }

    pub fn matches(&self, serial_number: &str) -> bool {
        self.pattern.is_match(serial_number)
    }

    /// Failure message for `field` when the value does not match
    pub fn mismatch_message(&self, field: &str) -> String {
        format!(
            "The {} does not match the equipment type mask {}.",
            crate::validation::attribute_label(field),
            self.mask
        )
    }
}
