//! Property-based tests for folder deletion.
//!
//! Deleting a folder removes every item in it and no item anywhere else.

use deckodecko::database::Database;
use deckodecko::managers::folder_repository::{FolderRepository, FolderRepositoryTrait};
use deckodecko::managers::item_repository::{ItemRepository, ItemRepositoryTrait};
use deckodecko::types::item::{BookmarkType, NewItem};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn delete_folder_removes_exactly_its_items(
        in_doomed in proptest::collection::btree_set(1i64..500, 0..15),
        elsewhere in proptest::collection::btree_set(1i64..500, 0..15),
    ) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let conn = db.connection();
        let mut folders = FolderRepository::new(conn);
        let mut items = ItemRepository::new(conn);

        let doomed = folders.create("doomed", 2).expect("create should succeed");
        for gacha_id in &in_doomed {
            items
                .create(&NewItem::new(*gacha_id, BookmarkType::Wish, "x").in_folder(doomed))
                .expect("create should succeed");
        }
        for gacha_id in &elsewhere {
            items
                .create(&NewItem::new(*gacha_id, BookmarkType::Get, "y"))
                .expect("create should succeed");
        }

        prop_assert!(folders.delete(doomed).expect("delete should succeed"));

        let remaining = items.get_all().expect("get_all should succeed");
        prop_assert!(remaining.iter().all(|i| i.folder_id != doomed));
        prop_assert_eq!(remaining.len(), elsewhere.len());
        prop_assert!(items.get_by_folder_id(doomed).expect("query should succeed").is_empty());
    }
}
