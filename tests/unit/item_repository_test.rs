//! Unit tests for the item repository.

use deckodecko::database::Database;
use deckodecko::managers::folder_repository::{FolderRepository, FolderRepositoryTrait};
use deckodecko::managers::item_repository::{ItemRepository, ItemRepositoryTrait};
use deckodecko::types::errors::StorageError;
use deckodecko::types::item::{BookmarkType, ItemPatch, NewItem};

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

#[test]
fn test_create_defaults_to_first_folder() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let id = repo.create(&NewItem::new(10, BookmarkType::Wish, "A")).unwrap();

    let item = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(item.folder_id, 1);
    assert_eq!(item.gacha_id, 10);
    assert_eq!(item.kind, BookmarkType::Wish);
    assert_eq!(item.thumbnail, None);
    assert_eq!(item.memo, None);
    assert!(!item.created_at.is_empty());
    assert!(!item.updated_at.is_empty());
}

#[test]
fn test_create_keeps_optional_fields() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let id = repo
        .create(
            &NewItem::new(11, BookmarkType::Get, "B")
                .with_thumbnail("https://img.example.com/b.png")
                .with_memo("from the 3rd floor machine"),
        )
        .unwrap();
    let item = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(item.thumbnail.as_deref(), Some("https://img.example.com/b.png"));
    assert_eq!(item.memo.as_deref(), Some("from the 3rd floor machine"));
}

#[test]
fn test_create_rejects_blank_name() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    assert!(matches!(
        repo.create(&NewItem::new(1, BookmarkType::Wish, " ")),
        Err(StorageError::Validation(_))
    ));
}

#[test]
fn test_same_gacha_twice_in_one_folder_is_a_constraint_violation() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    repo.create(&NewItem::new(7, BookmarkType::Wish, "A")).unwrap();
    let err = repo
        .create(&NewItem::new(7, BookmarkType::Get, "A again"))
        .unwrap_err();
    assert!(err.is_constraint_violation(), "got {:?}", err);
    assert_eq!(repo.get_all().unwrap().len(), 1);
}

#[test]
fn test_same_gacha_in_two_folders_is_allowed() {
    let db = setup();
    let conn = db.connection();
    let second = FolderRepository::new(conn).create("second", 2).unwrap();
    let mut repo = ItemRepository::new(conn);

    repo.create(&NewItem::new(7, BookmarkType::Wish, "A")).unwrap();
    repo.create(&NewItem::new(7, BookmarkType::Wish, "A").in_folder(second))
        .unwrap();
    assert_eq!(repo.get_by_gacha_id(7).unwrap().len(), 2);
}

#[test]
fn test_unknown_folder_is_rejected() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let err = repo
        .create(&NewItem::new(1, BookmarkType::Wish, "A").in_folder(77))
        .unwrap_err();
    assert!(err.is_constraint_violation());
}

#[test]
fn test_lists_are_newest_first() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let first = repo.create(&NewItem::new(1, BookmarkType::Wish, "first")).unwrap();
    let second = repo.create(&NewItem::new(2, BookmarkType::Wish, "second")).unwrap();
    let third = repo.create(&NewItem::new(3, BookmarkType::Get, "third")).unwrap();

    let ids: Vec<i64> = repo.get_all().unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![third, second, first]);

    let ids: Vec<i64> = repo.get_by_folder_id(1).unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![third, second, first]);
}

#[test]
fn test_get_by_folder_id_filters() {
    let db = setup();
    let conn = db.connection();
    let other = FolderRepository::new(conn).create("other", 2).unwrap();
    let mut repo = ItemRepository::new(conn);
    repo.create(&NewItem::new(1, BookmarkType::Wish, "a")).unwrap();
    repo.create(&NewItem::new(2, BookmarkType::Wish, "b").in_folder(other))
        .unwrap();

    let items = repo.get_by_folder_id(other).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "b");
    assert!(repo.get_by_folder_id(12345).unwrap().is_empty());
}

#[test]
fn test_get_by_name_is_exact() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    repo.create(&NewItem::new(1, BookmarkType::Wish, "Figure")).unwrap();

    assert_eq!(repo.get_by_name("Figure").unwrap().unwrap().gacha_id, 1);
    assert!(repo.get_by_name("Fig").unwrap().is_none());
}

#[test]
fn test_get_by_name_returns_newest_duplicate() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    repo.create(&NewItem::new(1, BookmarkType::Wish, "Figure")).unwrap();
    let newer = repo.create(&NewItem::new(2, BookmarkType::Get, "Figure")).unwrap();

    let found = repo.get_by_name("Figure").unwrap().unwrap();
    assert_eq!(found.id, newer);
    assert_eq!(found.gacha_id, 2);
}

#[test]
fn test_update_partial_leaves_other_fields() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let id = repo
        .create(&NewItem::new(5, BookmarkType::Wish, "name").with_memo("memo"))
        .unwrap();
    let before = repo.get_by_id(id).unwrap().unwrap();

    let patch = ItemPatch {
        kind: Some(BookmarkType::Get),
        ..ItemPatch::default()
    };
    assert!(repo.update(id, &patch).unwrap());

    let after = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(after.kind, BookmarkType::Get);
    assert_eq!(after.name, before.name);
    assert_eq!(after.memo, before.memo);
    assert_eq!(after.folder_id, before.folder_id);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn test_update_can_clear_nullable_column() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let id = repo
        .create(&NewItem::new(5, BookmarkType::Wish, "n").with_memo("memo"))
        .unwrap();

    let patch = ItemPatch {
        memo: Some(None),
        ..ItemPatch::default()
    };
    assert!(repo.update(id, &patch).unwrap());
    assert_eq!(repo.get_by_id(id).unwrap().unwrap().memo, None);
}

#[test]
fn test_update_edge_cases() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let id = repo.create(&NewItem::new(5, BookmarkType::Wish, "n")).unwrap();

    assert!(!repo.update(id, &ItemPatch::default()).unwrap());
    let rename = ItemPatch {
        name: Some("x".to_string()),
        ..ItemPatch::default()
    };
    assert!(!repo.update(9999, &rename).unwrap());
    let blank = ItemPatch {
        name: Some("".to_string()),
        ..ItemPatch::default()
    };
    assert!(matches!(repo.update(id, &blank), Err(StorageError::Validation(_))));
}

#[test]
fn test_moving_into_folder_with_same_gacha_fails() {
    let db = setup();
    let conn = db.connection();
    let other = FolderRepository::new(conn).create("other", 2).unwrap();
    let mut repo = ItemRepository::new(conn);
    repo.create(&NewItem::new(3, BookmarkType::Wish, "a")).unwrap();
    let moving = repo
        .create(&NewItem::new(3, BookmarkType::Wish, "b").in_folder(other))
        .unwrap();

    let patch = ItemPatch {
        folder_id: Some(1),
        ..ItemPatch::default()
    };
    assert!(repo.update(moving, &patch).unwrap_err().is_constraint_violation());
}

#[test]
fn test_delete_and_clear() {
    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    let a = repo.create(&NewItem::new(1, BookmarkType::Wish, "a")).unwrap();
    repo.create(&NewItem::new(2, BookmarkType::Wish, "b")).unwrap();
    repo.create(&NewItem::new(3, BookmarkType::Wish, "c")).unwrap();

    assert!(repo.delete(a).unwrap());
    assert!(!repo.delete(a).unwrap());
    assert_eq!(repo.clear().unwrap(), 2);
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn test_migrate_on_current_schema_is_a_no_op() {
    use deckodecko::database::migrations::MigrationOutcome;

    let db = setup();
    let mut repo = ItemRepository::new(db.connection());
    assert_eq!(repo.migrate().unwrap(), MigrationOutcome::AlreadyCurrent);
}
