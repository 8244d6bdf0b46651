//! Account entity model and DTOs.

use maintai_core::error::CoreError;
use maintai_core::roles::DEFAULT_ROLE;
use maintai_core::types::{DbId, Timestamp};
use maintai_core::validation::require_non_empty;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `accounts` table.
///
/// The secret is opaque and compared verbatim by whoever authenticates;
/// it is never serialized.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Account {
    pub id: DbId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccount {
    pub username: String,
    pub password: String,
    /// Defaults to `technician` if omitted.
    pub role: Option<String>,
}

/// A validated, defaulted account awaiting its identity.
#[derive(Debug, Clone)]
pub(crate) struct NewAccount {
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: Timestamp,
}

impl CreateAccount {
    pub(crate) fn prepare(&self, now: Timestamp) -> Result<NewAccount, CoreError> {
        require_non_empty(&self.username, "username")?;
        require_non_empty(&self.password, "password")?;
        let role = self.role.clone().unwrap_or_else(|| DEFAULT_ROLE.to_string());
        validate_role(&role)?;

        Ok(NewAccount {
            username: self.username.clone(),
            password: self.password.clone(),
            role,
            created_at: now,
        })
    }
}

impl NewAccount {
    pub(crate) fn into_account(self, id: DbId) -> Account {
        Account {
            id,
            username: self.username,
            password: self.password,
            role: self.role,
            created_at: self.created_at,
        }
    }
}

pub(crate) fn validate_role(role: &str) -> Result<(), CoreError> {
    require_non_empty(role, "role")
}

pub(crate) fn username_conflict(username: &str) -> CoreError {
    CoreError::Conflict(format!("account with username '{username}' already exists"))
}
