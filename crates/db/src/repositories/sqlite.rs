//! SQLite-backed store.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use maintai_core::error::CoreError;
use maintai_core::types::DbId;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use super::{AccountRepo, MachineRepo, MaintenanceRecordRepo, SecurityEventRepo};
use crate::error::RepoError;
use crate::models::account::{self, Account, CreateAccount};
use crate::models::machine::{self, CreateMachine, Machine, UpdateMachine};
use crate::models::maintenance_record::{
    self, CreateMaintenanceRecord, MaintenanceRecord, UpdateMaintenanceRecord,
};
use crate::models::security_event::{CreateSecurityEvent, SecurityEvent};

/// Column list for accounts queries.
const ACCOUNT_COLUMNS: &str = "id, username, password, role, created_at";

/// Column list for machines queries.
const MACHINE_COLUMNS: &str = "id, identifier, name, machine_type, status, efficiency, \
    temperature, vibration, last_maintenance, created_at, updated_at";

/// Column list for maintenance_records queries.
const RECORD_COLUMNS: &str = "id, machine_id, kind, description, technician, status, \
    scheduled_date, completed_date, cost, created_at";

/// Column list for security_events queries.
const EVENT_COLUMNS: &str = "id, event_type, description, ip_address, username, severity, \
    created_at";

/// Stores every entity kind in a SQLite database. Rows survive restarts when
/// the database is file-backed.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) a database file and bring its schema up to date.
    pub async fn open(path: &Path) -> Result<Self, RepoError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true);
        let store = Self::connect_with(options, 5).await?;
        info!(path = %path.display(), "SQLite store opened");
        Ok(store)
    }

    /// Connect using a `sqlite:` URL.
    ///
    /// `sqlite::memory:` URLs are routed to [`SqliteStore::open_in_memory`] so
    /// every query sees the same database.
    pub async fn connect(url: &str) -> Result<Self, RepoError> {
        if url.contains(":memory:") {
            return Self::open_in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let store = Self::connect_with(options, 5).await?;
        info!(url, "SQLite store opened");
        Ok(store)
    }

    /// A private, empty in-memory database. It lives as long as the store.
    pub async fn open_in_memory() -> Result<Self, RepoError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // A second connection would open a second, empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn connect_with(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, RepoError> {
        let options = options
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), RepoError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("SQLite store migrations complete");
        Ok(())
    }

    /// Round-trip a trivial query to prove the database is reachable.
    pub async fn health_check(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Translate constraint violations into the same errors the in-memory
/// store raises.
fn map_write_error(err: sqlx::Error, on_unique: impl FnOnce() -> CoreError) -> RepoError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => on_unique().into(),
        _ => err.into(),
    }
}

fn map_record_write_error(err: sqlx::Error, machine_id: Option<DbId>) -> RepoError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            maintenance_record::unknown_machine(machine_id).into()
        }
        _ => err.into(),
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[async_trait]
impl AccountRepo for SqliteStore {
    async fn create_account(&self, input: &CreateAccount) -> Result<Account, RepoError> {
        let new = input.prepare(Utc::now())?;
        let query = format!(
            "INSERT INTO accounts (username, password, role, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&new.username)
            .bind(&new.password)
            .bind(&new.role)
            .bind(new.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, || account::username_conflict(&new.username)))
    }

    async fn find_account(&self, id: DbId) -> Result<Option<Account>, RepoError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1");
        Ok(sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepoError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1");
        Ok(sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, RepoError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id ASC");
        Ok(sqlx::query_as::<_, Account>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_account_role(
        &self,
        id: DbId,
        role: &str,
    ) -> Result<Option<Account>, RepoError> {
        account::validate_role(role)?;
        let query = format!(
            "UPDATE accounts SET role = ?2 WHERE id = ?1 RETURNING {ACCOUNT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?)
    }
}

// ---------------------------------------------------------------------------
// Machines
// ---------------------------------------------------------------------------

#[async_trait]
impl MachineRepo for SqliteStore {
    async fn create_machine(&self, input: &CreateMachine) -> Result<Machine, RepoError> {
        let new = input.prepare(Utc::now())?;
        let query = format!(
            "INSERT INTO machines
                (identifier, name, machine_type, status, efficiency, temperature,
                 vibration, last_maintenance, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             RETURNING {MACHINE_COLUMNS}"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(&new.identifier)
            .bind(&new.name)
            .bind(&new.machine_type)
            .bind(&new.status)
            .bind(new.efficiency)
            .bind(new.temperature)
            .bind(new.vibration)
            .bind(new.last_maintenance)
            .bind(new.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, || machine::identifier_conflict(&new.identifier)))
    }

    async fn find_machine(&self, id: DbId) -> Result<Option<Machine>, RepoError> {
        let query = format!("SELECT {MACHINE_COLUMNS} FROM machines WHERE id = ?1");
        Ok(sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_machine_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Machine>, RepoError> {
        let query = format!("SELECT {MACHINE_COLUMNS} FROM machines WHERE identifier = ?1");
        Ok(sqlx::query_as::<_, Machine>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_machines(&self) -> Result<Vec<Machine>, RepoError> {
        let query = format!("SELECT {MACHINE_COLUMNS} FROM machines ORDER BY id ASC");
        Ok(sqlx::query_as::<_, Machine>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_machine(
        &self,
        id: DbId,
        input: &UpdateMachine,
    ) -> Result<Option<Machine>, RepoError> {
        input.validate()?;
        let query = format!(
            "UPDATE machines SET
                identifier = COALESCE(?2, identifier),
                name = COALESCE(?3, name),
                machine_type = COALESCE(?4, machine_type),
                status = COALESCE(?5, status),
                efficiency = COALESCE(?6, efficiency),
                temperature = COALESCE(?7, temperature),
                vibration = COALESCE(?8, vibration),
                last_maintenance = COALESCE(?9, last_maintenance),
                updated_at = ?10
             WHERE id = ?1
             RETURNING {MACHINE_COLUMNS}"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .bind(&input.identifier)
            .bind(&input.name)
            .bind(&input.machine_type)
            .bind(&input.status)
            .bind(input.efficiency)
            .bind(input.temperature)
            .bind(input.vibration)
            .bind(input.last_maintenance)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, || {
                    machine::identifier_conflict(input.identifier.as_deref().unwrap_or_default())
                })
            })
    }
}

// ---------------------------------------------------------------------------
// Maintenance records
// ---------------------------------------------------------------------------

#[async_trait]
impl MaintenanceRecordRepo for SqliteStore {
    async fn create_maintenance_record(
        &self,
        input: &CreateMaintenanceRecord,
    ) -> Result<MaintenanceRecord, RepoError> {
        let new = input.prepare(Utc::now())?;
        let query = format!(
            "INSERT INTO maintenance_records
                (machine_id, kind, description, technician, status, scheduled_date,
                 completed_date, cost, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?8)
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(new.machine_id)
            .bind(&new.kind)
            .bind(&new.description)
            .bind(&new.technician)
            .bind(&new.status)
            .bind(new.scheduled_date)
            .bind(new.cost)
            .bind(new.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_record_write_error(e, new.machine_id))
    }

    async fn find_maintenance_record(
        &self,
        id: DbId,
    ) -> Result<Option<MaintenanceRecord>, RepoError> {
        let query = format!("SELECT {RECORD_COLUMNS} FROM maintenance_records WHERE id = ?1");
        Ok(sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_maintenance_records(
        &self,
        machine_id: Option<DbId>,
    ) -> Result<Vec<MaintenanceRecord>, RepoError> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM maintenance_records
             WHERE ?1 IS NULL OR machine_id = ?1
             ORDER BY created_at DESC, id ASC"
        );
        Ok(sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(machine_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_maintenance_record(
        &self,
        id: DbId,
        input: &UpdateMaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, RepoError> {
        input.validate()?;
        let query = format!(
            "UPDATE maintenance_records SET
                machine_id = COALESCE(?2, machine_id),
                kind = COALESCE(?3, kind),
                description = COALESCE(?4, description),
                technician = COALESCE(?5, technician),
                status = COALESCE(?6, status),
                scheduled_date = COALESCE(?7, scheduled_date),
                completed_date = COALESCE(?8, completed_date),
                cost = COALESCE(?9, cost)
             WHERE id = ?1
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(id)
            .bind(input.machine_id)
            .bind(&input.kind)
            .bind(&input.description)
            .bind(&input.technician)
            .bind(&input.status)
            .bind(input.scheduled_date)
            .bind(input.completed_date)
            .bind(input.cost)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_record_write_error(e, input.machine_id))
    }
}

// ---------------------------------------------------------------------------
// Security events
// ---------------------------------------------------------------------------

#[async_trait]
impl SecurityEventRepo for SqliteStore {
    async fn create_security_event(
        &self,
        input: &CreateSecurityEvent,
    ) -> Result<SecurityEvent, RepoError> {
        let new = input.prepare(Utc::now())?;
        let query = format!(
            "INSERT INTO security_events
                (event_type, description, ip_address, username, severity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {EVENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, SecurityEvent>(&query)
            .bind(&new.event_type)
            .bind(&new.description)
            .bind(&new.ip_address)
            .bind(&new.username)
            .bind(&new.severity)
            .bind(new.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_security_event(&self, id: DbId) -> Result<Option<SecurityEvent>, RepoError> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM security_events WHERE id = ?1");
        Ok(sqlx::query_as::<_, SecurityEvent>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_security_events(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<SecurityEvent>, RepoError> {
        // SQLite treats a negative LIMIT as unbounded; zero also means no limit.
        let limit = limit
            .filter(|&n| n > 0)
            .map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM security_events
             ORDER BY created_at DESC, id ASC
             LIMIT ?1"
        );
        Ok(sqlx::query_as::<_, SecurityEvent>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }
}
