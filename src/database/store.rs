//! The shared, lazily opened database handle.
//!
//! A [`Store`] is constructed once at process start and handed to whatever
//! needs storage. The physical open happens on the first request; every
//! request re-runs the idempotent schema bootstrap. Blocking SQLite work is
//! moved onto tokio's blocking pool, so the awaiting caller can be dropped
//! without interrupting a write: the closure always runs to its end and any
//! transaction inside it commits or rolls back on its own.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use super::connection::Database;
use crate::types::errors::StorageError;

/// Handle shared between the store and in-flight blocking tasks.
pub type SharedDatabase = Arc<Mutex<Database>>;

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

pub struct Store {
    location: StoreLocation,
    // Held across the open, so concurrent first callers wait for one open.
    handle: AsyncMutex<Option<SharedDatabase>>,
}

impl Store {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            handle: AsyncMutex::new(None),
        }
    }

    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self::new(StoreLocation::File(path.as_ref().to_path_buf()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Returns the shared handle, opening the database on first use.
    ///
    /// # Errors
    /// [`StorageError::Unavailable`] when the file cannot be opened or the
    /// schema bootstrap fails. A failed open is not cached; the next call retries.
    pub async fn get_connection(&self) -> Result<SharedDatabase, StorageError> {
        let db = {
            let mut slot = self.handle.lock().await;
            match slot.as_ref() {
                Some(db) => db.clone(),
                None => {
                    let db = self.open().await?;
                    *slot = Some(db.clone());
                    db
                }
            }
        };

        let check = db.clone();
        run_blocking(move || {
            let guard = lock(&check)?;
            guard.bootstrap()
        })
        .await?;
        Ok(db)
    }

    async fn open(&self) -> Result<SharedDatabase, StorageError> {
        let location = self.location.clone();
        let db = run_blocking(move || match &location {
            StoreLocation::File(path) => Database::open(path),
            StoreLocation::Memory => Database::open_in_memory(),
        })
        .await
        .inspect_err(|e| warn!(error = %e, "database open failed"))?;
        info!(location = ?self.location, "database opened");
        Ok(Arc::new(Mutex::new(db)))
    }

    /// Runs `op` against the connection on the blocking pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.get_connection().await?;
        run_blocking(move || {
            let guard = lock(&db)?;
            op(guard.connection())
        })
        .await
    }

    /// True once the database has been opened and not closed since.
    pub async fn is_open(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    /// Releases the store's handle. Tasks still holding it finish first;
    /// the connection closes when the last holder drops it.
    pub async fn close(&self) {
        if self.handle.lock().await.take().is_some() {
            debug!("database handle released");
        }
    }
}

fn lock(db: &SharedDatabase) -> Result<MutexGuard<'_, Database>, StorageError> {
    match db.lock() {
        Ok(guard) => Ok(guard),
        Err(poisoned) => {
            warn!("database mutex was poisoned, recovering");
            Ok(poisoned.into_inner())
        }
    }
}

async fn run_blocking<T, F>(op: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| StorageError::Unavailable(format!("storage task failed: {}", e)))?
}
