// Deckodecko bookmark view
// Joins stored bookmarks with their folder names and catalog records for the list screens.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::database::Store;
use crate::managers::folder_repository::{FolderRepository, FolderRepositoryTrait};
use crate::managers::item_repository::{ItemRepository, ItemRepositoryTrait};
use crate::services::catalog_client::CatalogSource;
use crate::types::bookmark::{BookmarkEntry, GachaGroup, UNKNOWN_FOLDER_NAME};
use crate::types::catalog::CatalogEntry;
use crate::types::errors::{CatalogError, StorageError};
use crate::types::folder::Folder;
use crate::types::item::{BookmarkType, Item};

/// Bookmarks of type `kind`, newest first, from one folder or (with `None`) all.
///
/// Each entry carries its folder name and, when the catalog answers, its
/// catalog record. A catalog failure leaves `catalog` empty on every entry
/// instead of failing the whole view.
pub async fn load_bookmarks<C: CatalogSource>(
    store: &Store,
    catalog: &C,
    kind: BookmarkType,
    folder: Option<i64>,
) -> Result<Vec<BookmarkEntry>, StorageError> {
    let (items, folders) = store
        .run(move |conn| {
            let repo = ItemRepository::new(conn);
            let items = match folder {
                Some(folder_id) => repo.get_by_folder_id(folder_id)?,
                None => repo.get_all()?,
            };
            let folders = FolderRepository::new(conn).get_all()?;
            Ok((items, folders))
        })
        .await?;

    let items: Vec<Item> = items.into_iter().filter(|item| item.kind == kind).collect();
    let catalog = fetch_catalog(catalog, &items).await;
    let entries = merge(items, &folders, &catalog);
    debug!(count = entries.len(), kind = %kind, ?folder, "bookmark view loaded");
    Ok(entries)
}

async fn fetch_catalog<C: CatalogSource>(catalog: &C, items: &[Item]) -> HashMap<i64, CatalogEntry> {
    let ids: Vec<i64> = items
        .iter()
        .map(|item| item.gacha_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if ids.is_empty() {
        return HashMap::new();
    }

    match catalog.fetch_by_ids(&ids).await {
        Ok(records) => records.into_iter().map(|r| (r.id, r)).collect(),
        Err(CatalogError::NotConfigured) => HashMap::new(),
        Err(e) => {
            warn!(error = %e, "catalog lookup failed, showing bookmarks without catalog data");
            HashMap::new()
        }
    }
}

fn merge(
    items: Vec<Item>,
    folders: &[Folder],
    catalog: &HashMap<i64, CatalogEntry>,
) -> Vec<BookmarkEntry> {
    let names: HashMap<i64, &str> = folders.iter().map(|f| (f.id, f.name.as_str())).collect();
    items
        .into_iter()
        .map(|item| BookmarkEntry {
            folder_name: names
                .get(&item.folder_id)
                .copied()
                .unwrap_or(UNKNOWN_FOLDER_NAME)
                .to_string(),
            catalog: catalog.get(&item.gacha_id).cloned(),
            item,
        })
        .collect()
}

/// Groups entries by `gacha_id`, in order of each id's first appearance.
/// A group's `folder_name` is taken from its first entry.
pub fn group_by_gacha(entries: Vec<BookmarkEntry>) -> Vec<GachaGroup> {
    let mut groups: Vec<GachaGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for entry in entries {
        let gacha_id = entry.item.gacha_id;
        match index.get(&gacha_id) {
            Some(&at) => groups[at].entries.push(entry),
            None => {
                index.insert(gacha_id, groups.len());
                groups.push(GachaGroup {
                    gacha_id,
                    folder_name: entry.folder_name.clone(),
                    entries: vec![entry],
                });
            }
        }
    }
    groups
}
