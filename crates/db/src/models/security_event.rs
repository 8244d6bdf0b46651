//! Security event entity model and DTOs. Events are append-only.

use maintai_core::error::CoreError;
use maintai_core::security::{validate_event, validate_severity, AuditEvent, DEFAULT_SEVERITY};
use maintai_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `security_events` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SecurityEvent {
    pub id: DbId,
    pub event_type: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub username: Option<String>,
    pub severity: String,
    pub created_at: Timestamp,
}

/// DTO for recording a new security event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSecurityEvent {
    pub event_type: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub username: Option<String>,
    /// Defaults to `info` if omitted.
    pub severity: Option<String>,
}

/// A validated, defaulted event awaiting its identity.
#[derive(Debug, Clone)]
pub(crate) struct NewSecurityEvent {
    pub event_type: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub username: Option<String>,
    pub severity: String,
    pub created_at: Timestamp,
}

impl CreateSecurityEvent {
    pub(crate) fn prepare(&self, now: Timestamp) -> Result<NewSecurityEvent, CoreError> {
        validate_event(&self.event_type, &self.description)?;
        let severity = self
            .severity
            .clone()
            .unwrap_or_else(|| DEFAULT_SEVERITY.to_string());
        validate_severity(&severity)?;

        Ok(NewSecurityEvent {
            event_type: self.event_type.clone(),
            description: self.description.clone(),
            ip_address: self.ip_address.clone(),
            username: self.username.clone(),
            severity,
            created_at: now,
        })
    }
}

impl NewSecurityEvent {
    pub(crate) fn into_event(self, id: DbId) -> SecurityEvent {
        SecurityEvent {
            id,
            event_type: self.event_type,
            description: self.description,
            ip_address: self.ip_address,
            username: self.username,
            severity: self.severity,
            created_at: self.created_at,
        }
    }
}

impl AuditEvent for SecurityEvent {
    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
