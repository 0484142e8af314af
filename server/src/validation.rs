//! Field validation for todo write payloads.
//!
//! # Design
//! `validate` is a plain function returning `Result<TodoInput,
//! ValidationErrors>`. Every field is checked and all failures are collected,
//! so a caller sending `{"title": 5, "isCompleted": "yes"}` learns about both
//! problems in one response. Titles are never trimmed: a whitespace-only
//! title is rejected as missing, but surrounding whitespace on an otherwise
//! valid title is stored as sent.

use std::fmt;

use serde_json::Value;

use crate::model::{TodoInput, TodoPayload, TITLE_MAX_CHARS};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty list of field errors for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Render each error as `"field: message"`.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

/// Check a raw payload and produce the validated input.
pub fn validate(payload: &TodoPayload) -> Result<TodoInput, ValidationErrors> {
    let mut errors = Vec::new();

    let title = match validate_title(payload.title.as_ref()) {
        Ok(title) => Some(title),
        Err(err) => {
            errors.push(err);
            None
        }
    };

    let is_completed = match validate_is_completed(payload.is_completed.as_ref()) {
        Ok(flag) => flag,
        Err(err) => {
            errors.push(err);
            false
        }
    };

    match title {
        Some(title) if errors.is_empty() => Ok(TodoInput {
            title,
            is_completed,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

fn validate_title(value: Option<&Value>) -> Result<String, FieldError> {
    let title = match value {
        None => return Err(FieldError::new("title", "The Title field is required.")),
        Some(Value::String(title)) => title,
        Some(_) => return Err(FieldError::new("title", "The Title field must be a string.")),
    };
    if title.trim().is_empty() {
        return Err(FieldError::new("title", "The Title field is required."));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(FieldError::new(
            "title",
            format!("The field Title must be a string with a maximum length of {TITLE_MAX_CHARS}."),
        ));
    }
    Ok(title.clone())
}

fn validate_is_completed(value: Option<&Value>) -> Result<bool, FieldError> {
    match value {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(FieldError::new(
            "isCompleted",
            "The IsCompleted field must be a boolean.",
        )),
    }
}
