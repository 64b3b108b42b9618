use serde::{Deserialize, Serialize};

/// A read-only record from the remote gacha catalog.
///
/// Only the fields the bookmark screens render are modelled; unknown fields
/// in the remote payload are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_kr: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub media_id: Option<i64>,
}
