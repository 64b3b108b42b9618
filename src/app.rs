//! App Core for Deckodecko.
//!
//! Owns the shared store and the services around it, and runs the startup
//! and shutdown sequences.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::database::Store;
use crate::services::catalog_client::Catalog;
use crate::services::flag_store::{FileFlagStore, FlagStore};
use crate::services::migration_gate::{self, GateOutcome};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::StorageError;

/// Central application struct.
///
/// Repositories are not stored here: they borrow a connection, so they are
/// created inside [`Store::run`] closures where a connection is available.
pub struct App {
    pub store: Arc<Store>,
    pub settings_engine: Mutex<SettingsEngine>,
    pub catalog: Catalog,
    flags: Box<dyn FlagStore>,
}

impl App {
    /// Opens the app rooted at `data_dir`, reading settings from
    /// `settings_path` (or the platform config dir when `None`).
    ///
    /// The database file itself is opened lazily by the store.
    pub fn open(
        data_dir: &Path,
        settings_path: Option<PathBuf>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        fs::create_dir_all(data_dir)
            .map_err(|e| format!("cannot create data dir {}: {}", data_dir.display(), e))?;

        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            warn!(error = %e, "settings unreadable, using defaults");
        }

        let store = Store::file(settings_engine.database_path(data_dir));
        let flags = FileFlagStore::open(data_dir.join("flags.json"))?;
        let catalog = Catalog::from_settings(&settings_engine.get_settings().catalog)?;

        Ok(Self::from_parts(store, settings_engine, Box::new(flags), catalog))
    }

    pub fn from_parts(
        store: Store,
        settings_engine: SettingsEngine,
        flags: Box<dyn FlagStore>,
        catalog: Catalog,
    ) -> Self {
        Self {
            store: Arc::new(store),
            settings_engine: Mutex::new(settings_engine),
            catalog,
            flags,
        }
    }

    /// Locks the settings engine, recovering from a poisoned lock.
    pub fn settings(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Startup sequence: open the database, then run pending table upgrades.
    pub async fn startup(&mut self) -> Result<GateOutcome, StorageError> {
        self.store.get_connection().await?;
        let outcome = migration_gate::run_startup_migrations(&self.store, self.flags.as_mut()).await?;
        info!(location = ?self.store.location(), "app started");
        Ok(outcome)
    }

    /// Shutdown sequence: release the database handle.
    pub async fn shutdown(&self) {
        self.store.close().await;
        info!("app stopped");
    }
}
