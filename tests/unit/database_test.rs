//! Unit tests for the database layer (connection + bootstrap).

use deckodecko::database::Database;
use deckodecko::types::folder::{DEFAULT_FOLDER_ID, DEFAULT_FOLDER_NAME};
use rusqlite::Connection;

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn test_open_in_memory_succeeds() {
    assert!(Database::open_in_memory().is_ok());
}

#[test]
fn test_bootstrap_creates_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    for table in ["folders", "items", "images"] {
        let exists: bool = db
            .connection()
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after bootstrap", table);
    }
}

#[test]
fn test_bootstrap_creates_indexes() {
    let db = Database::open_in_memory().unwrap();
    for index in ["idx_items_folder_id", "idx_items_gacha_id"] {
        let exists: bool = db
            .connection()
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                [index],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "Index '{}' should exist", index);
    }
}

#[test]
fn test_default_folder_is_seeded_once() {
    let db = Database::open_in_memory().unwrap();
    db.bootstrap().unwrap();
    db.bootstrap().unwrap();

    let conn = db.connection();
    assert_eq!(count(conn, "SELECT COUNT(*) FROM folders"), 1);
    let (id, sequence, name): (i64, i64, String) = conn
        .query_row("SELECT id, sequence, name FROM folders", [], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .unwrap();
    assert_eq!(id, DEFAULT_FOLDER_ID);
    assert_eq!(sequence, 1);
    assert_eq!(name, DEFAULT_FOLDER_NAME);
}

#[test]
fn test_seed_skipped_when_folders_exist() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    conn.execute("DELETE FROM folders", []).unwrap();
    conn.execute("INSERT INTO folders (sequence, name) VALUES (1, 'mine')", [])
        .unwrap();

    db.bootstrap().unwrap();
    assert_eq!(count(conn, "SELECT COUNT(*) FROM folders"), 1);
    assert_eq!(
        count(conn, "SELECT COUNT(*) FROM folders WHERE name = 'mine'"),
        1
    );
}

#[test]
fn test_foreign_keys_enabled() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(count(db.connection(), "PRAGMA foreign_keys"), 1);
}

#[test]
fn test_reopen_file_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute("INSERT INTO folders (sequence, name) VALUES (2, 'kept')", [])
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(count(db.connection(), "SELECT COUNT(*) FROM folders"), 2);
}

#[test]
fn test_open_in_missing_directory_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no").join("such").join("dir.db");
    assert!(matches!(
        Database::open(&path),
        Err(deckodecko::types::errors::StorageError::Unavailable(_))
    ));
}

#[test]
fn test_file_database_uses_wal_and_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("pragmas.db")).unwrap();
    let conn = db.connection();

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
    assert_eq!(count(conn, "PRAGMA busy_timeout"), 5000);
    assert_eq!(count(conn, "PRAGMA foreign_keys"), 1);
}
