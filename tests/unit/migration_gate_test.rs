//! Startup migration gate: flag handling and retry behaviour.

use deckodecko::database::migrations::MigrationOutcome;
use deckodecko::database::Store;
use deckodecko::services::flag_store::{FileFlagStore, FlagStore, MemoryFlagStore};
use deckodecko::services::migration_gate::{
    run_startup_migrations, GateOutcome, MIGRATION_DONE, MIGRATION_ITEM_TABLE,
};
use deckodecko::types::errors::StorageError;
use rusqlite::Connection;

#[tokio::test]
async fn first_start_runs_and_sets_flag() {
    let store = Store::in_memory();
    let mut flags = MemoryFlagStore::new();

    let outcome = run_startup_migrations(&store, &mut flags).await.unwrap();
    match outcome {
        GateOutcome::Ran(report) => assert_eq!(report.items, MigrationOutcome::AlreadyCurrent),
        other => panic!("expected a run, got {:?}", other),
    }
    assert_eq!(flags.get(MIGRATION_ITEM_TABLE).as_deref(), Some(MIGRATION_DONE));
}

#[tokio::test]
async fn done_flag_skips_the_upgrade() {
    let store = Store::in_memory();
    let mut flags = MemoryFlagStore::new();
    flags.set(MIGRATION_ITEM_TABLE, "done").unwrap();

    let outcome = run_startup_migrations(&store, &mut flags).await.unwrap();
    assert_eq!(outcome, GateOutcome::AlreadyDone);
}

#[tokio::test]
async fn only_exact_done_counts() {
    let store = Store::in_memory();
    let mut flags = MemoryFlagStore::new();
    flags.set(MIGRATION_ITEM_TABLE, "DONE").unwrap();

    let outcome = run_startup_migrations(&store, &mut flags).await.unwrap();
    assert!(matches!(outcome, GateOutcome::Ran(_)));
    assert_eq!(flags.get(MIGRATION_ITEM_TABLE).as_deref(), Some("done"));
}

#[tokio::test]
async fn legacy_database_is_upgraded_once_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("app.db");
    let flags_path = dir.path().join("flags.json");
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE folders (id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, sequence INTEGER NOT NULL,
                 name TEXT NOT NULL, created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL);
             INSERT INTO folders (id, sequence, name) VALUES (1, 1, 'default');
             CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, folder_id INTEGER NOT NULL,
                 gacha_id INTEGER NOT NULL UNIQUE, type TEXT NOT NULL, name TEXT NOT NULL,
                 thumbnail TEXT, memo TEXT,
                 created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL,
                 updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL);
             INSERT INTO items (folder_id, gacha_id, type, name) VALUES (1, 9, 'WISH', 'n');",
        )
        .unwrap();
    }

    let store = Store::file(&db_path);
    let mut flags = FileFlagStore::open(&flags_path).unwrap();
    let first = run_startup_migrations(&store, &mut flags).await.unwrap();
    match first {
        GateOutcome::Ran(report) => assert_eq!(report.items, MigrationOutcome::Migrated { rows: 1 }),
        other => panic!("expected a run, got {:?}", other),
    }
    store.close().await;

    let store = Store::file(&db_path);
    let mut flags = FileFlagStore::open(&flags_path).unwrap();
    assert_eq!(
        run_startup_migrations(&store, &mut flags).await.unwrap(),
        GateOutcome::AlreadyDone
    );
}

#[tokio::test]
async fn failure_leaves_flag_unset() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::file(dir.path().join("missing").join("app.db"));
    let mut flags = MemoryFlagStore::new();

    let err = run_startup_migrations(&store, &mut flags).await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
    assert_eq!(flags.get(MIGRATION_ITEM_TABLE), None);
}
