//! Shared input validation helpers.
//!
//! Provides reusable checks used by the machine, maintenance, and security
//! modules so every entity reports bad input the same way.

use crate::error::CoreError;

/// Validate that a required text field is present and not blank.
pub fn require_non_empty(value: &str, name: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Validate that `value` is one of the `allowed` vocabulary entries.
pub fn validate_one_of(value: &str, allowed: &[&str], name: &str) -> Result<(), CoreError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {name} '{value}'. Must be one of: {allowed:?}"
        )))
    }
}

/// Validate that an integer percentage falls within `[0, 100]`.
pub fn validate_percentage(value: i32, name: &str) -> Result<(), CoreError> {
    if !(0..=100).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a reading is a finite number.
pub fn validate_finite(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}
