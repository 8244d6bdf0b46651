//! Maintenance record kind/status vocabularies and validators.

use crate::error::CoreError;
use crate::validation::{require_non_empty, validate_one_of};

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

pub const KIND_SCHEDULED: &str = "scheduled";
pub const KIND_REPAIR: &str = "repair";
pub const KIND_INSPECTION: &str = "inspection";

/// All valid maintenance record kinds.
pub const VALID_KINDS: &[&str] = &[KIND_SCHEDULED, KIND_REPAIR, KIND_INSPECTION];

// ---------------------------------------------------------------------------
// Lifecycle statuses
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_IN_PROGRESS: &str = "in-progress";
pub const STATUS_COMPLETED: &str = "completed";

/// All valid lifecycle statuses, in lifecycle order.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_IN_PROGRESS, STATUS_COMPLETED];

/// Status assigned when a record is created without one.
pub const DEFAULT_STATUS: &str = STATUS_PENDING;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_kind(kind: &str) -> Result<(), CoreError> {
    validate_one_of(kind, VALID_KINDS, "maintenance kind")
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    validate_one_of(status, VALID_STATUSES, "maintenance status")
}

/// Validate the free-text fields of a record.
pub fn validate_work_order(description: &str, technician: &str) -> Result<(), CoreError> {
    require_non_empty(description, "description")?;
    require_non_empty(technician, "technician")
}

/// Validate a monetary cost: finite and not negative.
pub fn validate_cost(cost: f64) -> Result<(), CoreError> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(CoreError::Validation(format!(
            "cost must be a non-negative amount, got {cost}"
        )));
    }
    Ok(())
}
