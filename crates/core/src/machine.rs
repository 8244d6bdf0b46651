//! Machine status vocabulary, telemetry defaults, and validators.
//!
//! Status is operator-set: nothing in this crate derives or writes it back.
//! The [`MonitoredMachine`] trait is the read-only view the analytics engine
//! consumes, so the engine never depends on a storage row type.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::{require_non_empty, validate_finite, validate_one_of, validate_percentage};

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Machine is running normally.
pub const STATUS_OPERATIONAL: &str = "operational";
/// Machine is running but an operator flagged a problem.
pub const STATUS_WARNING: &str = "warning";
/// Machine is out of service for maintenance.
pub const STATUS_MAINTENANCE: &str = "maintenance";

/// All valid machine statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_OPERATIONAL, STATUS_WARNING, STATUS_MAINTENANCE];

// ---------------------------------------------------------------------------
// Defaults applied on create
// ---------------------------------------------------------------------------

pub const DEFAULT_STATUS: &str = STATUS_OPERATIONAL;
pub const DEFAULT_EFFICIENCY: i32 = 100;
pub const DEFAULT_TEMPERATURE: f64 = 70.0;
pub const DEFAULT_VIBRATION: f64 = 1.0;

// ---------------------------------------------------------------------------
// Attention thresholds
// ---------------------------------------------------------------------------

/// Efficiency below this value flags a machine for attention.
pub const ATTENTION_MIN_EFFICIENCY: i32 = 70;
/// Temperature above this value flags a machine for attention.
pub const ATTENTION_MAX_TEMPERATURE: f64 = 85.0;
/// Vibration above this value flags a machine for attention.
pub const ATTENTION_MAX_VIBRATION: f64 = 4.0;

// ---------------------------------------------------------------------------
// Read-only view
// ---------------------------------------------------------------------------

/// Read-only view of a machine and its latest telemetry.
///
/// Implemented by the repository row type; tests implement it on small
/// fixtures.
pub trait MonitoredMachine {
    fn id(&self) -> DbId;
    /// External identifier, e.g. `CNC-001`.
    fn identifier(&self) -> &str;
    fn name(&self) -> &str;
    fn status(&self) -> &str;
    /// Efficiency percentage, `0..=100`.
    fn efficiency(&self) -> i32;
    fn temperature(&self) -> f64;
    fn vibration(&self) -> f64;
    fn last_maintenance(&self) -> Timestamp;
}

/// Whether a machine should be surfaced to an operator.
///
/// True when the operator already flagged it (`warning` or `maintenance`) or
/// when any reading crosses its attention threshold.
pub fn needs_attention<M: MonitoredMachine + ?Sized>(machine: &M) -> bool {
    machine.status() == STATUS_WARNING
        || machine.status() == STATUS_MAINTENANCE
        || machine.efficiency() < ATTENTION_MIN_EFFICIENCY
        || machine.temperature() > ATTENTION_MAX_TEMPERATURE
        || machine.vibration() > ATTENTION_MAX_VIBRATION
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a machine status string.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    validate_one_of(status, VALID_STATUSES, "machine status")
}

/// Validate the identifying text fields of a machine.
pub fn validate_identity(identifier: &str, name: &str, machine_type: &str) -> Result<(), CoreError> {
    require_non_empty(identifier, "identifier")?;
    require_non_empty(name, "name")?;
    require_non_empty(machine_type, "machine_type")
}

/// Validate a set of telemetry readings. `None` readings are skipped so the
/// same check serves both create and partial update.
pub fn validate_readings(
    efficiency: Option<i32>,
    temperature: Option<f64>,
    vibration: Option<f64>,
) -> Result<(), CoreError> {
    if let Some(e) = efficiency {
        validate_percentage(e, "efficiency")?;
    }
    if let Some(t) = temperature {
        validate_finite(t, "temperature")?;
    }
    if let Some(v) = vibration {
        validate_finite(v, "vibration")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
