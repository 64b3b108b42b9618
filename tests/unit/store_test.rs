//! Tests for the shared async store: lazy open, memoised initialisation, close.

use std::sync::Arc;

use deckodecko::database::{Store, StoreLocation};
use deckodecko::managers::folder_repository::{FolderRepository, FolderRepositoryTrait};
use deckodecko::managers::item_repository::{ItemRepository, ItemRepositoryTrait};
use deckodecko::types::errors::StorageError;
use deckodecko::types::item::{BookmarkType, NewItem};

#[tokio::test]
async fn store_opens_lazily() {
    let store = Store::in_memory();
    assert_eq!(store.location(), &StoreLocation::Memory);
    assert!(!store.is_open().await);

    store.get_connection().await.unwrap();
    assert!(store.is_open().await);
}

#[tokio::test]
async fn same_handle_is_returned_every_time() {
    let store = Store::in_memory();
    let a = store.get_connection().await.unwrap();
    let b = store.get_connection().await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_callers_seed_one_default_folder() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::file(dir.path().join("race.db")));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move { store.get_connection().await.map(|_| ()) }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let folders = store
        .run(|conn| FolderRepository::new(conn).get_all())
        .await
        .unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id, 1);
}

#[tokio::test]
async fn every_request_reruns_bootstrap() {
    let store = Store::in_memory();
    store
        .run(|conn| {
            conn.execute("DELETE FROM folders", [])?;
            Ok(())
        })
        .await
        .unwrap();

    // the next request reseeds the default folder
    let folders = store
        .run(|conn| FolderRepository::new(conn).get_all())
        .await
        .unwrap();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].is_default());
}

#[tokio::test]
async fn close_then_reopen_file_store_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::file(dir.path().join("keep.db"));

    store
        .run(|conn| ItemRepository::new(conn).create(&NewItem::new(5, BookmarkType::Get, "A")))
        .await
        .unwrap();
    store.close().await;
    assert!(!store.is_open().await);

    let items = store
        .run(|conn| ItemRepository::new(conn).get_all())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn unopenable_file_is_unavailable_and_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::file(dir.path().join("missing").join("x.db"));

    let err = store.get_connection().await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
    assert!(!store.is_open().await);

    std::fs::create_dir_all(dir.path().join("missing")).unwrap();
    assert!(store.get_connection().await.is_ok());
}

#[tokio::test]
async fn dropped_caller_does_not_cancel_the_write() {
    let store = Arc::new(Store::in_memory());
    store.get_connection().await.unwrap();

    let (started_tx, started_rx) = tokio::sync::oneshot::channel();
    let pending = store.run(move |conn| {
        let _ = started_tx.send(());
        std::thread::sleep(std::time::Duration::from_millis(100));
        FolderRepository::new(conn).create("late", 2)
    });

    // abandon the caller as soon as the write has started
    tokio::select! {
        _ = pending => panic!("write finished before it was abandoned"),
        _ = started_rx => {}
    }

    let found = store
        .run(|conn| FolderRepository::new(conn).find_by_name("late"))
        .await
        .unwrap();
    assert!(found.is_some());
}
