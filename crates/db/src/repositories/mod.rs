//! The repository contract and its two implementations.
//!
//! Each entity kind gets its own trait; [`Repository`] bundles all four so
//! callers can hold a single `Arc<dyn Repository>` without caring whether
//! rows live in process memory ([`MemoryStore`]) or SQLite ([`SqliteStore`]).
//!
//! Both implementations must agree on identity assignment, defaulting, and
//! ordering. `tests/conformance.rs` runs one suite against each.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use maintai_core::types::DbId;

use crate::error::RepoError;
use crate::models::account::{Account, CreateAccount};
use crate::models::machine::{CreateMachine, Machine, UpdateMachine};
use crate::models::maintenance_record::{
    CreateMaintenanceRecord, MaintenanceRecord, UpdateMaintenanceRecord,
};
use crate::models::security_event::{CreateSecurityEvent, SecurityEvent};

/// Accounts. Immutable after creation except for the role.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Create an account. A taken username is a conflict.
    async fn create_account(&self, input: &CreateAccount) -> Result<Account, RepoError>;

    async fn find_account(&self, id: DbId) -> Result<Option<Account>, RepoError>;

    async fn find_account_by_username(&self, username: &str)
        -> Result<Option<Account>, RepoError>;

    /// All accounts in creation order.
    async fn list_accounts(&self) -> Result<Vec<Account>, RepoError>;

    /// Change an account's role. Returns `None` if the id is absent.
    async fn update_account_role(
        &self,
        id: DbId,
        role: &str,
    ) -> Result<Option<Account>, RepoError>;
}

/// Machines and their latest telemetry.
#[async_trait]
pub trait MachineRepo: Send + Sync {
    /// Create a machine, applying telemetry defaults. A taken identifier is
    /// a conflict.
    async fn create_machine(&self, input: &CreateMachine) -> Result<Machine, RepoError>;

    async fn find_machine(&self, id: DbId) -> Result<Option<Machine>, RepoError>;

    async fn find_machine_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Machine>, RepoError>;

    /// All machines in creation order.
    async fn list_machines(&self) -> Result<Vec<Machine>, RepoError>;

    /// Apply a partial update and refresh `updated_at`. Returns `None` if the
    /// id is absent.
    async fn update_machine(
        &self,
        id: DbId,
        input: &UpdateMachine,
    ) -> Result<Option<Machine>, RepoError>;
}

/// Maintenance work orders.
#[async_trait]
pub trait MaintenanceRecordRepo: Send + Sync {
    /// Create a record. `completed_date` always starts empty. Referencing a
    /// machine that does not exist is rejected.
    async fn create_maintenance_record(
        &self,
        input: &CreateMaintenanceRecord,
    ) -> Result<MaintenanceRecord, RepoError>;

    async fn find_maintenance_record(
        &self,
        id: DbId,
    ) -> Result<Option<MaintenanceRecord>, RepoError>;

    /// Records newest first, optionally only those for one machine. Records
    /// created at the same instant keep insertion order.
    async fn list_maintenance_records(
        &self,
        machine_id: Option<DbId>,
    ) -> Result<Vec<MaintenanceRecord>, RepoError>;

    /// Apply a partial update. Returns `None` if the id is absent.
    async fn update_maintenance_record(
        &self,
        id: DbId,
        input: &UpdateMaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, RepoError>;
}

/// Append-only security audit trail.
#[async_trait]
pub trait SecurityEventRepo: Send + Sync {
    async fn create_security_event(
        &self,
        input: &CreateSecurityEvent,
    ) -> Result<SecurityEvent, RepoError>;

    async fn find_security_event(&self, id: DbId) -> Result<Option<SecurityEvent>, RepoError>;

    /// Events newest first, insertion order on equal timestamps.
    ///
    /// `Some(n)` keeps the `n` newest. `None` and `Some(0)` both return every
    /// event.
    async fn list_security_events(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<SecurityEvent>, RepoError>;
}

/// Every entity kind behind one handle.
pub trait Repository: AccountRepo + MachineRepo + MaintenanceRecordRepo + SecurityEventRepo {}

impl<T> Repository for T where
    T: AccountRepo + MachineRepo + MaintenanceRecordRepo + SecurityEventRepo
{
}
