//! Rule-table validation for aggregates.
//!
//! Each aggregate declares a static table mapping field names to an ordered
//! list of rules. [`validate_fields`] evaluates that table against a JSON
//! projection of the aggregate and reports every violated rule, per field, in
//! declaration order.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use validator::ValidateLength;

/// Field name to ordered violation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A single constraint applied to one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Field may be absent or null; when it is, no other rule runs.
    Optional,
    /// Rejects absent, null and empty string values.
    NotEmpty,
    /// Value must be a JSON string.
    IsString,
    /// Value must be a boolean.
    IsBoolean,
    /// Value must be a string of at most this many characters.
    MaxLength(u64),
}

impl Rule {
    fn check(self, value: Option<&Value>) -> bool {
        match self {
            Rule::Optional => true,
            Rule::NotEmpty => match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            },
            Rule::IsString => matches!(value, Some(Value::String(_))),
            Rule::IsBoolean => matches!(value, Some(Value::Bool(_))),
            Rule::MaxLength(max) => match value {
                Some(Value::String(s)) => s.validate_length(None, Some(max), None),
                _ => false,
            },
        }
    }

    fn message(self, field: &str) -> String {
        match self {
            Rule::Optional => String::new(),
            Rule::NotEmpty => format!("{field} should not be empty"),
            Rule::IsString => format!("{field} must be a string"),
            Rule::IsBoolean => format!("{field} must be a boolean value"),
            Rule::MaxLength(max) => {
                format!("{field} must be shorter than or equal to {max} characters")
            }
        }
    }
}

/// Ordered rules for one field of an aggregate.
#[derive(Clone, Copy, Debug)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

/// Evaluates `table` against `projection`.
///
/// Pure and deterministic: the same input always yields the same map with the
/// same message order.
pub fn validate_fields(table: &[FieldRules], projection: &Value) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for entry in table {
        let value = projection.get(entry.field);
        let optional = entry.rules.contains(&Rule::Optional);
        if optional && matches!(value, None | Some(Value::Null)) {
            continue;
        }

        let messages: Vec<String> = entry
            .rules
            .iter()
            .filter(|rule| **rule != Rule::Optional)
            .filter(|rule| !rule.check(value))
            .map(|rule| rule.message(entry.field))
            .collect();

        if !messages.is_empty() {
            errors.insert(entry.field.to_string(), messages);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Raised by validated entry points of an aggregate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Validation Error{}", describe(.errors))]
pub struct EntityValidationError {
    pub errors: FieldErrors,
}

impl EntityValidationError {
    pub fn new(errors: FieldErrors) -> Self {
        Self { errors }
    }

    /// Messages recorded for `field`, empty when the field passed.
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("; {field}: {}", messages.join(", ")))
        .collect()
}

impl From<FieldErrors> for EntityValidationError {
    fn from(errors: FieldErrors) -> Self {
        Self::new(errors)
    }
}

/// Runs `table` and wraps a failure into [`EntityValidationError`].
pub fn ensure_valid(table: &[FieldRules], projection: &Value) -> Result<(), EntityValidationError> {
    validate_fields(table, projection).map_err(EntityValidationError::from)
}
