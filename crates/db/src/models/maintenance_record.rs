//! Maintenance record entity model and DTOs.

use maintai_core::error::CoreError;
use maintai_core::maintenance::{
    validate_cost, validate_kind, validate_status, validate_work_order, DEFAULT_STATUS,
};
use maintai_core::types::{DbId, Timestamp};
use maintai_core::validation::require_non_empty;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `maintenance_records` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MaintenanceRecord {
    pub id: DbId,
    /// The machine worked on. Records may exist before assignment.
    pub machine_id: Option<DbId>,
    pub kind: String,
    pub description: String,
    pub technician: String,
    pub status: String,
    pub scheduled_date: Option<Timestamp>,
    /// Set only by an explicit completion update, never inferred from status.
    pub completed_date: Option<Timestamp>,
    pub cost: Option<f64>,
    pub created_at: Timestamp,
}

/// DTO for creating a new maintenance record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaintenanceRecord {
    pub machine_id: Option<DbId>,
    pub kind: String,
    pub description: String,
    pub technician: String,
    /// Defaults to `pending` if omitted.
    pub status: Option<String>,
    pub scheduled_date: Option<Timestamp>,
    pub cost: Option<f64>,
}

/// DTO for updating a maintenance record. All fields are optional; only
/// present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMaintenanceRecord {
    pub machine_id: Option<DbId>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub technician: Option<String>,
    pub status: Option<String>,
    pub scheduled_date: Option<Timestamp>,
    pub completed_date: Option<Timestamp>,
    pub cost: Option<f64>,
}

/// A validated, defaulted record awaiting its identity.
#[derive(Debug, Clone)]
pub(crate) struct NewMaintenanceRecord {
    pub machine_id: Option<DbId>,
    pub kind: String,
    pub description: String,
    pub technician: String,
    pub status: String,
    pub scheduled_date: Option<Timestamp>,
    pub cost: Option<f64>,
    pub created_at: Timestamp,
}

impl CreateMaintenanceRecord {
    pub(crate) fn prepare(&self, now: Timestamp) -> Result<NewMaintenanceRecord, CoreError> {
        validate_kind(&self.kind)?;
        validate_work_order(&self.description, &self.technician)?;
        let status = self.status.clone().unwrap_or_else(|| DEFAULT_STATUS.to_string());
        validate_status(&status)?;
        if let Some(cost) = self.cost {
            validate_cost(cost)?;
        }

        Ok(NewMaintenanceRecord {
            machine_id: self.machine_id,
            kind: self.kind.clone(),
            description: self.description.clone(),
            technician: self.technician.clone(),
            status,
            scheduled_date: self.scheduled_date,
            cost: self.cost,
            created_at: now,
        })
    }
}

impl NewMaintenanceRecord {
    pub(crate) fn into_record(self, id: DbId) -> MaintenanceRecord {
        MaintenanceRecord {
            id,
            machine_id: self.machine_id,
            kind: self.kind,
            description: self.description,
            technician: self.technician,
            status: self.status,
            scheduled_date: self.scheduled_date,
            completed_date: None,
            cost: self.cost,
            created_at: self.created_at,
        }
    }
}

impl UpdateMaintenanceRecord {
    /// Validate the fields that are present.
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        if let Some(kind) = &self.kind {
            validate_kind(kind)?;
        }
        if let Some(description) = &self.description {
            require_non_empty(description, "description")?;
        }
        if let Some(technician) = &self.technician {
            require_non_empty(technician, "technician")?;
        }
        if let Some(status) = &self.status {
            validate_status(status)?;
        }
        if let Some(cost) = self.cost {
            validate_cost(cost)?;
        }
        Ok(())
    }
}

impl MaintenanceRecord {
    /// Merge the present fields of `input`.
    pub(crate) fn apply(&mut self, input: &UpdateMaintenanceRecord) {
        if let Some(machine_id) = input.machine_id {
            self.machine_id = Some(machine_id);
        }
        if let Some(kind) = &input.kind {
            self.kind = kind.clone();
        }
        if let Some(description) = &input.description {
            self.description = description.clone();
        }
        if let Some(technician) = &input.technician {
            self.technician = technician.clone();
        }
        if let Some(status) = &input.status {
            self.status = status.clone();
        }
        if let Some(scheduled_date) = input.scheduled_date {
            self.scheduled_date = Some(scheduled_date);
        }
        if let Some(completed_date) = input.completed_date {
            self.completed_date = Some(completed_date);
        }
        if let Some(cost) = input.cost {
            self.cost = Some(cost);
        }
    }
}

pub(crate) fn unknown_machine(machine_id: Option<DbId>) -> CoreError {
    match machine_id {
        Some(id) => CoreError::Validation(format!("machine {id} does not exist")),
        None => CoreError::Validation("referenced machine does not exist".into()),
    }
}
