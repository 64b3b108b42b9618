//! Unit tests for the image reference repository.

use deckodecko::database::query_builder::{columns, Order, SelectOptions};
use deckodecko::database::Database;
use deckodecko::managers::image_repository::{ImageRepository, ImageRepositoryTrait};
use deckodecko::types::errors::{QueryError, StorageError};

#[test]
fn test_create_and_latest() {
    let db = Database::open_in_memory().unwrap();
    let mut repo = ImageRepository::new(db.connection());
    assert!(repo.get_latest().unwrap().is_none());

    repo.create("ph://one").unwrap();
    let second = repo.create("ph://two").unwrap();

    let latest = repo.get_latest().unwrap().unwrap();
    assert_eq!(latest.id, second);
    assert_eq!(latest.uri, "ph://two");
}

#[test]
fn test_get_all_defaults_to_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let mut repo = ImageRepository::new(db.connection());
    for uri in ["a", "b", "c"] {
        repo.create(uri).unwrap();
    }

    let uris: Vec<String> = repo
        .get_all(&SelectOptions::new())
        .unwrap()
        .into_iter()
        .map(|i| i.uri)
        .collect();
    assert_eq!(uris, vec!["c", "b", "a"]);

    let oldest_two: Vec<String> = repo
        .get_all(&SelectOptions::new().order_by("id", Order::Asc).limit(2))
        .unwrap()
        .into_iter()
        .map(|i| i.uri)
        .collect();
    assert_eq!(oldest_two, vec!["a", "b"]);
}

#[test]
fn test_delete_by_filter() {
    let db = Database::open_in_memory().unwrap();
    let mut repo = ImageRepository::new(db.connection());
    let id = repo.create("ph://gone").unwrap();
    repo.create("ph://kept").unwrap();

    assert!(repo.delete(&columns([("id", id)])).unwrap());
    assert!(!repo.delete(&columns([("uri", "ph://gone".to_string())])).unwrap());
    assert_eq!(repo.get_all(&SelectOptions::new()).unwrap().len(), 1);
}

#[test]
fn test_delete_without_filter_is_refused() {
    let db = Database::open_in_memory().unwrap();
    let mut repo = ImageRepository::new(db.connection());
    repo.create("ph://x").unwrap();
    assert!(matches!(
        repo.delete(&Vec::new()),
        Err(StorageError::Query(QueryError::EmptyFilter(_)))
    ));
    assert_eq!(repo.get_all(&SelectOptions::new()).unwrap().len(), 1);
}

#[test]
fn test_blank_uri_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let mut repo = ImageRepository::new(db.connection());
    assert!(matches!(repo.create(""), Err(StorageError::Validation(_))));
}
