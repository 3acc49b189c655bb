//! Durable local state: the key-value port, its backends, and the typed
//! stores built on top of it (bounded metric log, sessions, interactions).
mod bounded;
mod file;
mod interactions;
mod keys;
mod kv;
mod sessions;
mod sqlite;

#[cfg(test)]
mod tests;

pub use bounded::{MAX_STORED_METRICS, MetricStore};
pub use file::FileStore;
pub use interactions::{InteractionLog, MAX_STORED_INTERACTIONS, ReportInteraction};
pub use keys::{
    ACTIVE_SESSIONS_KEY, INTERACTIONS_KEY, METRICS_KEY, SESSION_ID_KEY, SESSION_START_KEY,
    USER_TOKEN_KEY,
};
pub use kv::{KeyValueStore, MemoryStore};
pub use sessions::{DEFAULT_SESSION_TTL, SessionBook, SessionRegistry};
pub use sqlite::SqliteStore;

use std::path::Path;
use std::sync::Arc;

use crate::error::AppResult;

/// Storage backend selected on the command line or in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Sqlite,
}

/// SQLite database file name used inside the store directory.
const SQLITE_FILE_NAME: &str = "reportpulse.db";

/// Opens the configured backend rooted at `path`.
///
/// # Errors
///
/// Returns an error when the directory or database cannot be created.
pub fn open_store(backend: StoreBackend, path: &Path) -> AppResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match backend {
        StoreBackend::File => Arc::new(FileStore::open(path)?),
        StoreBackend::Sqlite => {
            std::fs::create_dir_all(path).map_err(|err| crate::error::StoreError::CreateDir {
                path: path.to_path_buf(),
                source: err,
            })?;
            Arc::new(SqliteStore::open(&path.join(SQLITE_FILE_NAME))?)
        }
    };
    tracing::debug!("Opened {:?} store at {}", backend, path.display());
    Ok(store)
}
