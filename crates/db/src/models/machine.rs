//! Machine entity model and DTOs.

use maintai_core::error::CoreError;
use maintai_core::machine::{
    validate_identity, validate_readings, validate_status, MonitoredMachine, DEFAULT_EFFICIENCY,
    DEFAULT_STATUS, DEFAULT_TEMPERATURE, DEFAULT_VIBRATION,
};
use maintai_core::types::{DbId, Timestamp};
use maintai_core::validation::require_non_empty;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `machines` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Machine {
    pub id: DbId,
    /// Unique external identifier, e.g. `CNC-001`.
    pub identifier: String,
    pub name: String,
    pub machine_type: String,
    pub status: String,
    pub efficiency: i32,
    pub temperature: f64,
    pub vibration: f64,
    pub last_maintenance: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new machine.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMachine {
    pub identifier: String,
    pub name: String,
    pub machine_type: String,
    /// Defaults to `operational` if omitted.
    pub status: Option<String>,
    /// Defaults to 100 if omitted.
    pub efficiency: Option<i32>,
    /// Defaults to 70 if omitted.
    pub temperature: Option<f64>,
    /// Defaults to 1.0 if omitted.
    pub vibration: Option<f64>,
    /// Defaults to the creation time if omitted.
    pub last_maintenance: Option<Timestamp>,
}

/// DTO for updating an existing machine. All fields are optional; only
/// present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMachine {
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub machine_type: Option<String>,
    pub status: Option<String>,
    pub efficiency: Option<i32>,
    pub temperature: Option<f64>,
    pub vibration: Option<f64>,
    pub last_maintenance: Option<Timestamp>,
}

/// A validated, defaulted machine awaiting its identity.
#[derive(Debug, Clone)]
pub(crate) struct NewMachine {
    pub identifier: String,
    pub name: String,
    pub machine_type: String,
    pub status: String,
    pub efficiency: i32,
    pub temperature: f64,
    pub vibration: f64,
    pub last_maintenance: Timestamp,
    pub created_at: Timestamp,
}

impl CreateMachine {
    pub(crate) fn prepare(&self, now: Timestamp) -> Result<NewMachine, CoreError> {
        validate_identity(&self.identifier, &self.name, &self.machine_type)?;
        let status = self.status.clone().unwrap_or_else(|| DEFAULT_STATUS.to_string());
        validate_status(&status)?;
        validate_readings(self.efficiency, self.temperature, self.vibration)?;

        Ok(NewMachine {
            identifier: self.identifier.clone(),
            name: self.name.clone(),
            machine_type: self.machine_type.clone(),
            status,
            efficiency: self.efficiency.unwrap_or(DEFAULT_EFFICIENCY),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            vibration: self.vibration.unwrap_or(DEFAULT_VIBRATION),
            last_maintenance: self.last_maintenance.unwrap_or(now),
            created_at: now,
        })
    }
}

impl NewMachine {
    pub(crate) fn into_machine(self, id: DbId) -> Machine {
        Machine {
            id,
            identifier: self.identifier,
            name: self.name,
            machine_type: self.machine_type,
            status: self.status,
            efficiency: self.efficiency,
            temperature: self.temperature,
            vibration: self.vibration,
            last_maintenance: self.last_maintenance,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl UpdateMachine {
    /// Validate the fields that are present.
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        if let Some(identifier) = &self.identifier {
            require_non_empty(identifier, "identifier")?;
        }
        if let Some(name) = &self.name {
            require_non_empty(name, "name")?;
        }
        if let Some(machine_type) = &self.machine_type {
            require_non_empty(machine_type, "machine_type")?;
        }
        if let Some(status) = &self.status {
            validate_status(status)?;
        }
        validate_readings(self.efficiency, self.temperature, self.vibration)
    }
}

impl Machine {
    /// Merge the present fields of `input` and refresh `updated_at`.
    pub(crate) fn apply(&mut self, input: &UpdateMachine, now: Timestamp) {
        if let Some(identifier) = &input.identifier {
            self.identifier = identifier.clone();
        }
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(machine_type) = &input.machine_type {
            self.machine_type = machine_type.clone();
        }
        if let Some(status) = &input.status {
            self.status = status.clone();
        }
        if let Some(efficiency) = input.efficiency {
            self.efficiency = efficiency;
        }
        if let Some(temperature) = input.temperature {
            self.temperature = temperature;
        }
        if let Some(vibration) = input.vibration {
            self.vibration = vibration;
        }
        if let Some(last_maintenance) = input.last_maintenance {
            self.last_maintenance = last_maintenance;
        }
        self.updated_at = now;
    }
}

impl MonitoredMachine for Machine {
    fn id(&self) -> DbId {
        self.id
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn efficiency(&self) -> i32 {
        self.efficiency
    }

    fn temperature(&self) -> f64 {
        self.temperature
    }

    fn vibration(&self) -> f64 {
        self.vibration
    }

    fn last_maintenance(&self) -> Timestamp {
        self.last_maintenance
    }
}

pub(crate) fn identifier_conflict(identifier: &str) -> CoreError {
    CoreError::Conflict(format!("machine with identifier '{identifier}' already exists"))
}
