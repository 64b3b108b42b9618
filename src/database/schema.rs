//! Table definitions and first-run seeding.
//!
//! Fresh installs get every table directly in its current shape; older
//! shapes are upgraded by [`super::migrations`].

use std::time::Duration;

use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::types::folder::{DEFAULT_FOLDER_ID, DEFAULT_FOLDER_NAME};

pub const FOLDERS_TABLE: &str = "folders";
pub const ITEMS_TABLE: &str = "items";
pub const IMAGES_TABLE: &str = "images";

/// How long a writer waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

pub(crate) const FOLDERS_DDL: &str = "
    CREATE TABLE IF NOT EXISTS folders (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        sequence INTEGER NOT NULL,
        name TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL
    );";

/// Column list of `items`, shared by the DDL and the migration copy.
pub(crate) const ITEMS_COLUMNS: &str =
    "id, folder_id, gacha_id, type, name, thumbnail, memo, created_at, updated_at";

/// `items` body with one bookmark per catalog entry per folder.
pub(crate) fn items_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            folder_id INTEGER NOT NULL,
            gacha_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK(type IN ('WISH', 'GET')),
            name TEXT NOT NULL,
            thumbnail TEXT,
            memo TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL,
            UNIQUE (gacha_id, folder_id),
            FOREIGN KEY (folder_id) REFERENCES folders (id) ON DELETE CASCADE
        );"
    )
}

pub(crate) fn images_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uri TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL
        );"
    )
}

/// Per-connection pragmas. Foreign keys are off by default in SQLite.
///
/// WAL and the busy timeout are best effort: a failure is logged and the
/// connection stays usable.
pub fn configure(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    // in-memory databases answer "memory"
    match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0)) {
        Ok(mode) => debug!(mode = %mode, "journal mode set"),
        Err(e) => warn!(error = %e, "could not enable WAL journal"),
    }
    if let Err(e) = conn.busy_timeout(BUSY_TIMEOUT) {
        warn!(error = %e, "could not set busy timeout");
    }
    Ok(())
}

/// Creates missing tables and seeds the default folder into an empty `folders`.
pub fn bootstrap(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(FOLDERS_DDL)?;
    conn.execute_batch(&items_ddl(ITEMS_TABLE))?;
    conn.execute_batch(&images_ddl(IMAGES_TABLE))?;
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_items_folder_id ON items(folder_id);
         CREATE INDEX IF NOT EXISTS idx_items_gacha_id ON items(gacha_id);",
    )?;

    // Single statement so two bootstraps can never both see an empty table.
    let seeded = conn.execute(
        "INSERT OR IGNORE INTO folders (id, sequence, name)
         SELECT ?1, 1, ?2 WHERE NOT EXISTS (SELECT 1 FROM folders)",
        params![DEFAULT_FOLDER_ID, DEFAULT_FOLDER_NAME],
    )?;
    if seeded > 0 {
        info!(name = DEFAULT_FOLDER_NAME, "seeded default folder");
    }
    Ok(())
}

/// True when a table with this name exists.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )
}

/// Column names of `table`, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt
        .query_map([table], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
