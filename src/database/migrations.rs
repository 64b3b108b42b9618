//! Table-shape upgrades for databases created by older app versions.
//!
//! Each upgrade rebuilds one table: create a shadow table in the target
//! shape, copy the rows, check the copy, drop the old table, rename the
//! shadow. All steps run in one transaction with foreign key enforcement
//! switched off around it, and a `foreign_key_check` runs before commit.
//! A failure at any point leaves the old table untouched.
//!
//! Legacy `items` rows are normalised on the way over. Rows whose folder
//! no longer exists move to the default folder, or are dropped when that
//! folder is gone too. Of several rows sharing `(gacha_id, folder_id)`
//! only the earliest (lowest id) is kept. Dropped rows are counted in the log.
//!
//! Upgrades inspect the live table first and return early when it is
//! missing (fresh install) or already in the target shape, which makes
//! them safe to run on every start.

use rusqlite::Connection;
use serde::Serialize;
use tracing::{error, info, warn};

use super::schema::{self, IMAGES_TABLE, ITEMS_COLUMNS, ITEMS_TABLE};
use crate::types::errors::StorageError;
use crate::types::folder::DEFAULT_FOLDER_ID;

/// What an upgrade did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The table does not exist yet; bootstrap will create it in its final shape.
    Skipped,
    /// The table already has the target shape.
    AlreadyCurrent,
    /// The table was rebuilt and `rows` rows were carried over.
    Migrated { rows: usize },
}

/// Result of [`run_pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub items: MigrationOutcome,
    pub images: MigrationOutcome,
}

/// Runs every table upgrade in order.
pub fn run_pending(conn: &Connection) -> Result<MigrationReport, StorageError> {
    let items = migrate_items(conn)?;
    let images = migrate_images(conn)?;
    Ok(MigrationReport { items, images })
}

/// Moves `items` from a globally unique `gacha_id` to `UNIQUE(gacha_id, folder_id)`.
pub fn migrate_items(conn: &Connection) -> Result<MigrationOutcome, StorageError> {
    if !schema::table_exists(conn, ITEMS_TABLE)? {
        info!("items table does not exist, skipping migration");
        return Ok(MigrationOutcome::Skipped);
    }
    if has_unique_index(conn, ITEMS_TABLE, &["folder_id", "gacha_id"])? {
        info!("items table already has per-folder uniqueness");
        return Ok(MigrationOutcome::AlreadyCurrent);
    }

    let total: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    let orphans: i64 = conn.query_row(
        "SELECT COUNT(*) FROM items i LEFT JOIN folders f ON f.id = i.folder_id WHERE f.id IS NULL",
        [],
        |row| row.get(0),
    )?;
    if orphans > 0 {
        let default_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM folders WHERE id = ?1",
            [DEFAULT_FOLDER_ID],
            |row| row.get(0),
        )?;
        warn!(orphans, moved_to_default = default_exists, "legacy items point at deleted folders");
    }

    // Each row's folder, or the default folder when its own is gone.
    let source = format!(
        "FROM items i
         LEFT JOIN folders f ON f.id = i.folder_id
         LEFT JOIN folders d ON d.id = {default}
         WHERE COALESCE(f.id, d.id) IS NOT NULL",
        default = DEFAULT_FOLDER_ID
    );
    let copy = format!(
        "INSERT OR IGNORE INTO items_new ({cols})
         SELECT i.id, COALESCE(f.id, d.id), i.gacha_id, i.type, i.name,
                i.thumbnail, i.memo, i.created_at, i.updated_at
         {source}
         ORDER BY i.id",
        cols = ITEMS_COLUMNS,
        source = source
    );
    let expected = format!(
        "SELECT COUNT(*) FROM (SELECT DISTINCT i.gacha_id, COALESCE(f.id, d.id) {})",
        source
    );

    let rows = rebuild_table(
        conn,
        ITEMS_TABLE,
        &schema::items_ddl("items_new"),
        &copy,
        &expected,
    )?;
    let dropped = total as usize - rows;
    if dropped > 0 {
        warn!(dropped, "duplicate or unplaceable legacy items dropped");
    }
    info!(rows, "items table migrated to per-folder uniqueness");
    Ok(MigrationOutcome::Migrated { rows })
}

/// Renames the legacy `images.assetId` column to `uri`.
pub fn migrate_images(conn: &Connection) -> Result<MigrationOutcome, StorageError> {
    if !schema::table_exists(conn, IMAGES_TABLE)? {
        info!("images table does not exist, skipping migration");
        return Ok(MigrationOutcome::Skipped);
    }
    let columns = schema::table_columns(conn, IMAGES_TABLE)?;
    let has_asset_id = columns.iter().any(|c| c == "assetId");
    let has_uri = columns.iter().any(|c| c == "uri");
    if !has_asset_id || has_uri {
        info!("images table already migrated");
        return Ok(MigrationOutcome::AlreadyCurrent);
    }

    let rows = rebuild_table(
        conn,
        IMAGES_TABLE,
        &schema::images_ddl("images_new"),
        "INSERT INTO images_new (id, uri, created_at) SELECT id, assetId, created_at FROM images",
        "SELECT COUNT(*) FROM images",
    )?;
    info!(rows, "images table migrated to uri column");
    Ok(MigrationOutcome::Migrated { rows })
}

/// Runs `op` with foreign key enforcement off, restoring the previous setting.
///
/// The pragma is a no-op inside a transaction, so this must wrap one.
fn with_foreign_keys_off<T>(
    conn: &Connection,
    op: impl FnOnce() -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let enabled: bool = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    if enabled {
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    }
    let result = op();
    if enabled {
        if let Err(e) = conn.execute_batch("PRAGMA foreign_keys = ON;") {
            error!(error = %e, "could not re-enable foreign keys");
        }
    }
    result
}

/// Copy, verify, drop, rename, all inside one transaction.
///
/// `expected_sql` counts the rows `copy_sql` must write; any other count
/// rolls the rebuild back.
fn rebuild_table(
    conn: &Connection,
    table: &str,
    shadow_ddl: &str,
    copy_sql: &str,
    expected_sql: &str,
) -> Result<usize, StorageError> {
    let shadow = format!("{}_new", table);
    let fail = |step: &str, e: rusqlite::Error| {
        error!(table, step, error = %e, "table rebuild failed");
        StorageError::MigrationFailure(format!("{} ({}): {}", table, step, e))
    };

    with_foreign_keys_off(conn, || {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| fail("begin", e))?;

        // A shadow left behind by an interrupted run holds no data of record.
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", shadow))
            .map_err(|e| fail("drop stale shadow", e))?;
        tx.execute_batch(shadow_ddl)
            .map_err(|e| fail("create shadow", e))?;

        let expected: i64 = tx
            .query_row(expected_sql, [], |row| row.get(0))
            .map_err(|e| fail("count rows", e))?;
        let copied = tx.execute(copy_sql, []).map_err(|e| fail("copy rows", e))?;
        if expected as usize != copied {
            error!(table, expected, copied, "row count mismatch, rolling back");
            return Err(StorageError::MigrationFailure(format!(
                "{}: copied {} of {} rows",
                table, copied, expected
            )));
        }

        tx.execute_batch(&format!("DROP TABLE {};", table))
            .map_err(|e| fail("drop original", e))?;
        tx.execute_batch(&format!("ALTER TABLE {} RENAME TO {};", shadow, table))
            .map_err(|e| fail("rename shadow", e))?;

        let violations = {
            let mut check = tx
                .prepare(&format!("PRAGMA foreign_key_check({})", table))
                .map_err(|e| fail("foreign key check", e))?;
            let rows = check
                .query_map([], |_| Ok(()))
                .map_err(|e| fail("foreign key check", e))?;
            rows.count()
        };
        if violations > 0 {
            error!(table, violations, "foreign key violations after rebuild, rolling back");
            return Err(StorageError::MigrationFailure(format!(
                "{}: {} rows violate foreign keys",
                table, violations
            )));
        }

        tx.commit().map_err(|e| fail("commit", e))?;
        Ok(copied)
    })
}

/// True when `table` has a UNIQUE index over exactly `columns` (any order).
fn has_unique_index(conn: &Connection, table: &str, columns: &[&str]) -> Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(r#"SELECT name FROM pragma_index_list(?1) WHERE "unique" = 1"#)?;
    let indexes = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut wanted: Vec<&str> = columns.to_vec();
    wanted.sort_unstable();

    for index in indexes {
        let mut info = conn.prepare("SELECT name FROM pragma_index_info(?1)")?;
        let mut indexed = info
            .query_map([&index], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        indexed.sort_unstable();
        if indexed == wanted {
            return Ok(true);
        }
    }
    Ok(false)
}
