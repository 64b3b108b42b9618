// Deckodecko startup migration gate
// Runs the table upgrades once per install, remembered through a persistent flag.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::database::migrations::{self, MigrationReport};
use crate::database::Store;
use crate::services::flag_store::FlagStore;
use crate::types::errors::StorageError;

/// Flag key marking the per-folder item upgrade as finished.
pub const MIGRATION_ITEM_TABLE: &str = "MIGRATION_ITEM_TABLE";

/// Value stored under [`MIGRATION_ITEM_TABLE`] once the upgrade succeeded.
pub const MIGRATION_DONE: &str = "done";

/// What the gate decided at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateOutcome {
    /// The flag was already set; nothing ran.
    AlreadyDone,
    /// The upgrades ran; the flag is now set.
    Ran(MigrationReport),
}

/// Runs pending table upgrades unless the flag says they already finished.
///
/// Only the exact value `"done"` counts as finished; any other stored value
/// is treated as unset. On failure the flag is left alone so the next start
/// retries, and the error is returned to the caller.
pub async fn run_startup_migrations(
    store: &Store,
    flags: &mut dyn FlagStore,
) -> Result<GateOutcome, StorageError> {
    match flags.get(MIGRATION_ITEM_TABLE) {
        Some(value) if value == MIGRATION_DONE => {
            info!("item table migration already done");
            return Ok(GateOutcome::AlreadyDone);
        }
        Some(value) => warn!(value = %value, "unexpected migration flag value, migrating again"),
        None => {}
    }

    let report = store
        .run(|conn| migrations::run_pending(conn))
        .await
        .inspect_err(|e| error!(error = %e, "startup migration failed"))?;

    // a lost write only means the upgrades re-check their tables next start
    if let Err(e) = flags.set(MIGRATION_ITEM_TABLE, MIGRATION_DONE) {
        warn!(error = %e, "could not record migration flag");
    }
    info!(?report, "startup migrations finished");
    Ok(GateOutcome::Ran(report))
}
