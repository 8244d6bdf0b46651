//! Ephemeral in-process store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use maintai_core::types::DbId;

use super::{AccountRepo, MachineRepo, MaintenanceRecordRepo, SecurityEventRepo};
use crate::error::RepoError;
use crate::models::account::{self, Account, CreateAccount};
use crate::models::machine::{self, CreateMachine, Machine, UpdateMachine};
use crate::models::maintenance_record::{
    self, CreateMaintenanceRecord, MaintenanceRecord, UpdateMaintenanceRecord,
};
use crate::models::security_event::{CreateSecurityEvent, SecurityEvent};

/// Monotonic identity counter owned by a single table.
#[derive(Debug)]
struct IdSequence {
    next: DbId,
}

impl IdSequence {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn next_id(&mut self) -> DbId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Rows of one entity kind plus their identity counter. Both live behind the
/// same lock, so assigning an id and storing the row is one step.
#[derive(Debug)]
struct Table<T> {
    ids: IdSequence,
    rows: BTreeMap<DbId, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            ids: IdSequence::new(),
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(DbId) -> T) -> T {
        let id = self.ids.next_id();
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }
}

/// Stores every entity kind in process memory.
///
/// Each kind has its own lock, so writes to different kinds never contend.
/// Dropping the store discards all rows; a new store starts every identity
/// sequence at 1.
#[derive(Debug)]
pub struct MemoryStore {
    accounts: Mutex<Table<Account>>,
    machines: Mutex<Table<Machine>>,
    maintenance_records: Mutex<Table<MaintenanceRecord>>,
    security_events: Mutex<Table<SecurityEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        tracing::debug!("Created in-memory store");
        Self {
            accounts: Mutex::new(Table::new()),
            machines: Mutex::new(Table::new()),
            maintenance_records: Mutex::new(Table::new()),
            security_events: Mutex::new(Table::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<'a, T>(
    table: &'a Mutex<Table<T>>,
    name: &'static str,
) -> Result<MutexGuard<'a, Table<T>>, RepoError> {
    table.lock().map_err(|_| RepoError::Poisoned(name))
}

/// Sort newest first by creation time, insertion order (identity ascending)
/// on ties.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, DbId)) {
    rows.sort_by(|a, b| {
        let (created_a, id_a) = key(a);
        let (created_b, id_b) = key(b);
        created_b.cmp(&created_a).then(id_a.cmp(&id_b))
    });
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn create_account(&self, input: &CreateAccount) -> Result<Account, RepoError> {
        let new = input.prepare(Utc::now())?;
        let mut table = lock(&self.accounts, "accounts")?;
        if table.rows.values().any(|a| a.username == new.username) {
            return Err(account::username_conflict(&new.username).into());
        }
        Ok(table.insert_with(|id| new.into_account(id)))
    }

    async fn find_account(&self, id: DbId) -> Result<Option<Account>, RepoError> {
        Ok(lock(&self.accounts, "accounts")?.rows.get(&id).cloned())
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepoError> {
        let table = lock(&self.accounts, "accounts")?;
        Ok(table.rows.values().find(|a| a.username == username).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, RepoError> {
        Ok(lock(&self.accounts, "accounts")?.rows.values().cloned().collect())
    }

    async fn update_account_role(
        &self,
        id: DbId,
        role: &str,
    ) -> Result<Option<Account>, RepoError> {
        account::validate_role(role)?;
        let mut table = lock(&self.accounts, "accounts")?;
        Ok(table.rows.get_mut(&id).map(|a| {
            a.role = role.to_string();
            a.clone()
        }))
    }
}

// ---------------------------------------------------------------------------
// Machines
// ---------------------------------------------------------------------------

#[async_trait]
impl MachineRepo for MemoryStore {
    async fn create_machine(&self, input: &CreateMachine) -> Result<Machine, RepoError> {
        let new = input.prepare(Utc::now())?;
        let mut table = lock(&self.machines, "machines")?;
        if table.rows.values().any(|m| m.identifier == new.identifier) {
            return Err(machine::identifier_conflict(&new.identifier).into());
        }
        Ok(table.insert_with(|id| new.into_machine(id)))
    }

    async fn find_machine(&self, id: DbId) -> Result<Option<Machine>, RepoError> {
        Ok(lock(&self.machines, "machines")?.rows.get(&id).cloned())
    }

    async fn find_machine_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Machine>, RepoError> {
        let table = lock(&self.machines, "machines")?;
        Ok(table
            .rows
            .values()
            .find(|m| m.identifier == identifier)
            .cloned())
    }

    async fn list_machines(&self) -> Result<Vec<Machine>, RepoError> {
        Ok(lock(&self.machines, "machines")?.rows.values().cloned().collect())
    }

    async fn update_machine(
        &self,
        id: DbId,
        input: &UpdateMachine,
    ) -> Result<Option<Machine>, RepoError> {
        input.validate()?;
        let mut table = lock(&self.machines, "machines")?;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(identifier) = &input.identifier {
            if table
                .rows
                .values()
                .any(|m| m.id != id && &m.identifier == identifier)
            {
                return Err(machine::identifier_conflict(identifier).into());
            }
        }
        Ok(table.rows.get_mut(&id).map(|m| {
            m.apply(input, Utc::now());
            m.clone()
        }))
    }
}

// ---------------------------------------------------------------------------
// Maintenance records
// ---------------------------------------------------------------------------

impl MemoryStore {
    fn ensure_machine_exists(&self, machine_id: Option<DbId>) -> Result<(), RepoError> {
        let Some(id) = machine_id else {
            return Ok(());
        };
        if lock(&self.machines, "machines")?.rows.contains_key(&id) {
            Ok(())
        } else {
            Err(maintenance_record::unknown_machine(Some(id)).into())
        }
    }
}

#[async_trait]
impl MaintenanceRecordRepo for MemoryStore {
    async fn create_maintenance_record(
        &self,
        input: &CreateMaintenanceRecord,
    ) -> Result<MaintenanceRecord, RepoError> {
        let new = input.prepare(Utc::now())?;
        self.ensure_machine_exists(new.machine_id)?;
        let mut table = lock(&self.maintenance_records, "maintenance_records")?;
        Ok(table.insert_with(|id| new.into_record(id)))
    }

    async fn find_maintenance_record(
        &self,
        id: DbId,
    ) -> Result<Option<MaintenanceRecord>, RepoError> {
        let table = lock(&self.maintenance_records, "maintenance_records")?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn list_maintenance_records(
        &self,
        machine_id: Option<DbId>,
    ) -> Result<Vec<MaintenanceRecord>, RepoError> {
        let table = lock(&self.maintenance_records, "maintenance_records")?;
        let mut records: Vec<MaintenanceRecord> = table
            .rows
            .values()
            .filter(|r| machine_id.is_none() || r.machine_id == machine_id)
            .cloned()
            .collect();
        newest_first(&mut records, |r| (r.created_at, r.id));
        Ok(records)
    }

    async fn update_maintenance_record(
        &self,
        id: DbId,
        input: &UpdateMaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, RepoError> {
        input.validate()?;
        if !lock(&self.maintenance_records, "maintenance_records")?
            .rows
            .contains_key(&id)
        {
            return Ok(None);
        }
        self.ensure_machine_exists(input.machine_id)?;
        let mut table = lock(&self.maintenance_records, "maintenance_records")?;
        Ok(table.rows.get_mut(&id).map(|r| {
            r.apply(input);
            r.clone()
        }))
    }
}

// ---------------------------------------------------------------------------
// Security events
// ---------------------------------------------------------------------------

#[async_trait]
impl SecurityEventRepo for MemoryStore {
    async fn create_security_event(
        &self,
        input: &CreateSecurityEvent,
    ) -> Result<SecurityEvent, RepoError> {
        let new = input.prepare(Utc::now())?;
        let mut table = lock(&self.security_events, "security_events")?;
        Ok(table.insert_with(|id| new.into_event(id)))
    }

    async fn find_security_event(&self, id: DbId) -> Result<Option<SecurityEvent>, RepoError> {
        Ok(lock(&self.security_events, "security_events")?
            .rows
            .get(&id)
            .cloned())
    }

    async fn list_security_events(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<SecurityEvent>, RepoError> {
        let table = lock(&self.security_events, "security_events")?;
        let mut events: Vec<SecurityEvent> = table.rows.values().cloned().collect();
        newest_first(&mut events, |e| (e.created_at, e.id));
        if let Some(limit) = limit.filter(|&n| n > 0) {
            events.truncate(limit);
        }
        Ok(events)
    }
}
