//! Field validation: ordered rule chains and the field-path keyed error report.
//!
//! Each field owns an ordered list of [`Rule`]s. Rules of one field stop at the
//! first failure, but every field is checked before the report is returned, so
//! one request yields one complete [`ValidationErrors`] map.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Field path (`serial_number`, `serial_number.2`) to its failure messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report with a single failed field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Append every message of `other`, keeping first-seen field order
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing failed
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.values().flatten().next() {
            Some(first) if self.0.len() > 1 => {
                write!(f, "{} (and {} more field(s))", first, self.0.len() - 1)
            }
            Some(first) => f.write_str(first),
            None => f.write_str("The given data was invalid."),
        }
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, failures) in source.field_errors() {
            let field = field.to_string();
            for failure in failures.iter() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} is invalid.", attribute_label(&field)));
                errors.add(field.clone(), message);
            }
        }
        errors
    }
}

/// Human label for a field path: `serial_number.2` -> `serial number.2`
pub fn attribute_label(field: &str) -> String {
    field.replace('_', " ")
}

/// Syntactic rule applied to a raw JSON field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present, not null, not an empty string or empty array
    Required,
    /// `null` skips the rest of the chain
    Nullable,
    String,
    Integer,
    StringOrArray,
    /// At most `n` characters
    Max(usize),
}

impl Rule {
    fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        let label = attribute_label(field);
        match self {
            Rule::Required if is_empty_value(value) => {
                Err(format!("The {} field is required.", label))
            }
            Rule::String if !value.is_string() => Err(format!("The {} must be a string.", label)),
            Rule::Integer if as_integer(value).is_none() => {
                Err(format!("The {} must be an integer.", label))
            }
            Rule::StringOrArray if !(value.is_string() || value.is_array()) => {
                Err(format!("The {} must be a string or an array.", label))
            }
            Rule::Max(max) if exceeds(value, *max) => Err(format!(
                "The {} must not be greater than {} characters.",
                label, max
            )),
            _ => Ok(()),
        }
    }
}

/// Run `rules` in order against `value`, stopping at the first failure.
///
/// An absent field is only checked when the chain contains [`Rule::Required`];
/// a `null` value is skipped when the chain contains [`Rule::Nullable`].
/// Returns `true` when the field passed (or was skipped).
pub fn check_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Value>,
    rules: &[Rule],
) -> bool {
    let value = match value {
        Some(v) => v,
        None if rules.contains(&Rule::Required) => &Value::Null,
        None => return true,
    };
    match run_rules(field, value, rules) {
        Ok(()) => true,
        Err(message) => {
            errors.add(field, message);
            false
        }
    }
}

/// Run `rules` in order against a present value and return the first failure.
pub fn run_rules(field: &str, value: &Value, rules: &[Rule]) -> Result<(), String> {
    if value.is_null() && rules.contains(&Rule::Nullable) {
        return Ok(());
    }
    rules.iter().try_for_each(|rule| rule.check(field, value))
}

/// Integer view of a JSON value: integral numbers and strings holding one.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn exceeds(value: &Value, max: usize) -> bool {
    match value {
        Value::String(s) => s.chars().count() > max,
        Value::Array(items) => items.len() > max,
        _ => false,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Message for a value that collides with an existing row
pub fn taken_message(field: &str) -> String {
    format!("The {} has already been taken.", attribute_label(field))
}

/// Message for a reference to a row that does not exist
pub fn invalid_selection_message(field: &str) -> String {
    format!("The selected {} is invalid.", attribute_label(field))
}
