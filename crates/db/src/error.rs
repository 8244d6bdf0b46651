use maintai_core::error::CoreError;

/// Error returned by every repository operation.
///
/// Absence is not an error: lookups return `Ok(None)`. Validation failures
/// and unique-key conflicts arrive as [`RepoError::Core`]; anything the
/// backing medium reports is passed through untouched and never retried.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Rejected input or a unique-key conflict.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure reported by the SQLite backing store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The database file's directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migrations could not be applied.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An in-process table lock was poisoned by a panicking writer.
    #[error("Store table '{0}' is poisoned")]
    Poisoned(&'static str),
}

impl RepoError {
    /// Whether this error is a unique-key conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepoError::Core(CoreError::Conflict(_)))
    }

    /// Whether this error is rejected input.
    pub fn is_validation(&self) -> bool {
        matches!(self, RepoError::Core(CoreError::Validation(_)))
    }
}
