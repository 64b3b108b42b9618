use serde::{Deserialize, Serialize};

use super::catalog::CatalogEntry;
use super::item::Item;

/// Folder label used when an item's folder is no longer known.
pub const UNKNOWN_FOLDER_NAME: &str = "기타";

/// An item joined with its folder name and catalog record, as rendered by
/// the bookmark list screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    #[serde(flatten)]
    pub item: Item,
    pub folder_name: String,
    pub catalog: Option<CatalogEntry>,
}

/// Bookmarks of one catalog entry, grouped for the per-gacha view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GachaGroup {
    pub gacha_id: i64,
    pub folder_name: String,
    pub entries: Vec<BookmarkEntry>,
}

impl GachaGroup {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
