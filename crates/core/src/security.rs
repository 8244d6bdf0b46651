//! Security event vocabulary and the security posture summary.
//!
//! Security events are append-only. The summary here is derived from the
//! most recent events only; callers decide how many to fetch.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::{require_non_empty, validate_one_of};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

pub const EVENT_LOGIN: &str = "login";
pub const EVENT_FAILED_LOGIN: &str = "failed_login";
pub const EVENT_SECURITY_SCAN: &str = "security_scan";
pub const EVENT_SYSTEM_UPDATE: &str = "system_update";
pub const EVENT_ACCESS_DENIED: &str = "access_denied";

// ---------------------------------------------------------------------------
// Severities
// ---------------------------------------------------------------------------

pub const SEVERITY_INFO: &str = "info";
pub const SEVERITY_WARNING: &str = "warning";
pub const SEVERITY_CRITICAL: &str = "critical";
pub const SEVERITY_HIGH: &str = "high";

/// All valid severities.
pub const VALID_SEVERITIES: &[&str] = &[
    SEVERITY_INFO,
    SEVERITY_WARNING,
    SEVERITY_CRITICAL,
    SEVERITY_HIGH,
];

/// Severity assigned when an event is recorded without one.
pub const DEFAULT_SEVERITY: &str = SEVERITY_INFO;

/// Number of recent events the posture summary is computed over by default.
pub const DEFAULT_STATUS_WINDOW: usize = 10;

/// Look-back for counting failed logins, in hours.
pub const FAILED_LOGIN_WINDOW_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_severity(severity: &str) -> Result<(), CoreError> {
    validate_one_of(severity, VALID_SEVERITIES, "severity")
}

/// Event types are open-ended; only emptiness is rejected.
pub fn validate_event(event_type: &str, description: &str) -> Result<(), CoreError> {
    require_non_empty(event_type, "event_type")?;
    require_non_empty(description, "description")
}

// ---------------------------------------------------------------------------
// Posture summary
// ---------------------------------------------------------------------------

/// Read-only view of a recorded security event.
pub trait AuditEvent {
    fn event_type(&self) -> &str;
    fn created_at(&self) -> Timestamp;
}

/// Summary of recent security activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityStatus {
    /// `failed_login` events within the last [`FAILED_LOGIN_WINDOW_HOURS`].
    pub failed_logins_today: usize,
    /// Creation time of the first `security_scan` event in the input, if any.
    pub last_security_scan: Option<Timestamp>,
}

/// Summarize a newest-first slice of recent events.
pub fn security_status<E: AuditEvent>(recent: &[E], now: Timestamp) -> SecurityStatus {
    let cutoff = now - chrono::Duration::hours(FAILED_LOGIN_WINDOW_HOURS);

    let failed_logins_today = recent
        .iter()
        .filter(|e| e.event_type() == EVENT_FAILED_LOGIN && e.created_at() > cutoff)
        .count();

    let last_security_scan = recent
        .iter()
        .find(|e| e.event_type() == EVENT_SECURITY_SCAN)
        .map(|e| e.created_at());

    SecurityStatus {
        failed_logins_today,
        last_security_scan,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
