pub mod error;
pub mod models;
pub mod repositories;
pub mod seed;

use std::path::Path;
use std::sync::Arc;

pub use error::RepoError;
pub use repositories::{
    AccountRepo, MachineRepo, MaintenanceRecordRepo, MemoryStore, Repository, SecurityEventRepo,
    SqliteStore,
};

/// Open the store the process will use.
///
/// `None` selects the ephemeral [`MemoryStore`]. Anything else is treated
/// as a `sqlite:` URL, or as a file path when it lacks that scheme. The
/// SQLite store is health-checked before it is handed out.
pub async fn open_store(database_url: Option<&str>) -> Result<Arc<dyn Repository>, RepoError> {
    let Some(url) = database_url else {
        tracing::info!("No database configured, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let store = if url.starts_with("sqlite:") {
        SqliteStore::connect(url).await?
    } else {
        SqliteStore::open(Path::new(url)).await?
    };
    store.health_check().await?;
    Ok(Arc::new(store))
}
