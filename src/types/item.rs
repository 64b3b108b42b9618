use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Deserializer, Serialize};

/// Bookmark state: wanted or owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookmarkType {
    #[serde(rename = "WISH")]
    Wish,
    #[serde(rename = "GET")]
    Get,
}

impl BookmarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkType::Wish => "WISH",
            BookmarkType::Get => "GET",
        }
    }
}

impl fmt::Display for BookmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookmarkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WISH" => Ok(BookmarkType::Wish),
            "GET" => Ok(BookmarkType::Get),
            other => Err(format!("unknown bookmark type: {}", other)),
        }
    }
}

impl ToSql for BookmarkType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BookmarkType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl From<BookmarkType> for Value {
    fn from(kind: BookmarkType) -> Self {
        Value::Text(kind.as_str().to_string())
    }
}

/// A user's bookmark of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub folder_id: i64,
    pub gacha_id: i64,
    #[serde(rename = "type")]
    pub kind: BookmarkType,
    pub name: String,
    pub thumbnail: Option<String>,
    pub memo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a bookmark. A missing `folder_id` targets the default folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub folder_id: Option<i64>,
    pub gacha_id: i64,
    #[serde(rename = "type")]
    pub kind: BookmarkType,
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl NewItem {
    pub fn new(gacha_id: i64, kind: BookmarkType, name: impl Into<String>) -> Self {
        Self {
            folder_id: None,
            gacha_id,
            kind,
            name: name.into(),
            thumbnail: None,
            memo: None,
        }
    }

    pub fn in_folder(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Keeps `null` distinct from an absent key: `Some(None)` clears the column.
fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// A partial update. Only `Some` fields are written.
///
/// For nullable columns the inner `Option` is the new value, so
/// `memo: Some(None)` clears the memo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BookmarkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub memo: Option<Option<String>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.folder_id.is_none()
            && self.kind.is_none()
            && self.name.is_none()
            && self.thumbnail.is_none()
            && self.memo.is_none()
    }

    /// Column/value pairs in table declaration order.
    pub fn columns(&self) -> Vec<(&'static str, Value)> {
        let mut cols = Vec::new();
        if let Some(folder_id) = self.folder_id {
            cols.push(("folder_id", Value::Integer(folder_id)));
        }
        if let Some(kind) = self.kind {
            cols.push(("type", Value::from(kind)));
        }
        if let Some(name) = &self.name {
            cols.push(("name", Value::Text(name.clone())));
        }
        if let Some(thumbnail) = &self.thumbnail {
            cols.push(("thumbnail", Value::from(thumbnail.clone())));
        }
        if let Some(memo) = &self.memo {
            cols.push(("memo", Value::from(memo.clone())));
        }
        cols
    }

    /// Builds the minimal patch that turns `original` into `desired`.
    pub fn diff(original: &ItemDraft, desired: &ItemDraft) -> Self {
        fn changed<T: PartialEq + Clone>(a: &T, b: &T) -> Option<T> {
            if a != b {
                Some(b.clone())
            } else {
                None
            }
        }

        Self {
            folder_id: changed(&original.folder_id, &desired.folder_id),
            kind: changed(&original.kind, &desired.kind),
            name: changed(&original.name, &desired.name),
            thumbnail: changed(&original.thumbnail, &desired.thumbnail),
            memo: changed(&original.memo, &desired.memo),
        }
    }
}

/// The user-editable fields of an item, as held by the edit sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub folder_id: i64,
    #[serde(rename = "type")]
    pub kind: BookmarkType,
    pub name: String,
    pub thumbnail: Option<String>,
    pub memo: Option<String>,
}

impl From<&Item> for ItemDraft {
    fn from(item: &Item) -> Self {
        Self {
            folder_id: item.folder_id,
            kind: item.kind,
            name: item.name.clone(),
            thumbnail: item.thumbnail.clone(),
            memo: item.memo.clone(),
        }
    }
}
