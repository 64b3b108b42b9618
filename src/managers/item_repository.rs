//! Item Repository for Deckodecko.
//!
//! Implements `ItemRepositoryTrait`: bookmark CRUD and lookups over the
//! `items` table. One catalog entry can be bookmarked once per folder; the
//! `UNIQUE(gacha_id, folder_id)` constraint enforces it and a duplicate
//! insert surfaces as [`StorageError::ConstraintViolation`].

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::database::migrations::{self, MigrationOutcome};
use crate::database::query_builder::{columns, Columns, Order, Query, SelectOptions, Statement};
use crate::database::schema::ITEMS_TABLE;
use crate::types::errors::StorageError;
use crate::types::folder::DEFAULT_FOLDER_ID;
use crate::types::item::{Item, ItemPatch, NewItem};

/// Trait defining bookmark item operations.
pub trait ItemRepositoryTrait {
    fn create(&mut self, item: &NewItem) -> Result<i64, StorageError>;
    fn get_all(&self) -> Result<Vec<Item>, StorageError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Item>, StorageError>;
    fn get_by_folder_id(&self, folder_id: i64) -> Result<Vec<Item>, StorageError>;
    fn get_by_gacha_id(&self, gacha_id: i64) -> Result<Vec<Item>, StorageError>;
    fn get_by_name(&self, name: &str) -> Result<Option<Item>, StorageError>;
    fn update(&mut self, id: i64, patch: &ItemPatch) -> Result<bool, StorageError>;
    fn delete(&mut self, id: i64) -> Result<bool, StorageError>;
    fn clear(&mut self) -> Result<usize, StorageError>;
    fn migrate(&mut self) -> Result<MigrationOutcome, StorageError>;
}

/// Item repository over a borrowed SQLite connection.
pub struct ItemRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ItemRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get("id")?,
            folder_id: row.get("folder_id")?,
            gacha_id: row.get("gacha_id")?,
            kind: row.get("type")?,
            name: row.get("name")?,
            thumbnail: row.get("thumbnail")?,
            memo: row.get("memo")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Newest first; ids break ties between rows created in the same second.
    fn newest_first(filter: Columns) -> SelectOptions {
        SelectOptions {
            filter,
            ..SelectOptions::default()
        }
        .order_by("created_at", Order::Desc)
        .order_by("id", Order::Desc)
    }

    fn query(&self, stmt: &Statement) -> Result<Vec<Item>, StorageError> {
        let mut prepared = self.conn.prepare(&stmt.sql)?;
        let rows = prepared.query_map(stmt.params(), Self::row_to_item)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn query_one(&self, stmt: &Statement) -> Result<Option<Item>, StorageError> {
        Ok(self
            .conn
            .query_row(&stmt.sql, stmt.params(), Self::row_to_item)
            .optional()?)
    }

    fn require_name(name: &str) -> Result<(), StorageError> {
        if name.trim().is_empty() {
            return Err(StorageError::Validation("item name is empty".to_string()));
        }
        Ok(())
    }
}

impl<'a> ItemRepositoryTrait for ItemRepository<'a> {
    /// Inserts a bookmark and returns its id.
    ///
    /// Optional fields that are `None` are left out of the column list.
    fn create(&mut self, item: &NewItem) -> Result<i64, StorageError> {
        Self::require_name(&item.name)?;

        let folder_id = item.folder_id.unwrap_or(DEFAULT_FOLDER_ID);
        let mut values: Columns = vec![
            ("folder_id".to_string(), Value::from(folder_id)),
            ("gacha_id".to_string(), Value::from(item.gacha_id)),
            ("type".to_string(), Value::from(item.kind)),
            ("name".to_string(), Value::from(item.name.clone())),
        ];
        if let Some(thumbnail) = &item.thumbnail {
            values.push(("thumbnail".to_string(), Value::from(thumbnail.clone())));
        }
        if let Some(memo) = &item.memo {
            values.push(("memo".to_string(), Value::from(memo.clone())));
        }

        let stmt = Query::insert(ITEMS_TABLE, values).compile()?;
        match self.conn.execute(&stmt.sql, stmt.params()) {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!(id, gacha_id = item.gacha_id, folder_id, "item created");
                Ok(id)
            }
            Err(e) => {
                let err = StorageError::from(e);
                if err.is_constraint_violation() {
                    warn!(gacha_id = item.gacha_id, folder_id, error = %err, "item rejected");
                }
                Err(err)
            }
        }
    }

    fn get_all(&self) -> Result<Vec<Item>, StorageError> {
        self.query(&Query::select(ITEMS_TABLE, Self::newest_first(Vec::new())).compile()?)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Item>, StorageError> {
        let opts = SelectOptions::new().where_eq("id", id);
        self.query_one(&Query::select(ITEMS_TABLE, opts).compile()?)
    }

    fn get_by_folder_id(&self, folder_id: i64) -> Result<Vec<Item>, StorageError> {
        let opts = Self::newest_first(columns([("folder_id", folder_id)]));
        self.query(&Query::select(ITEMS_TABLE, opts).compile()?)
    }

    /// Every bookmark of one catalog entry, across folders.
    fn get_by_gacha_id(&self, gacha_id: i64) -> Result<Vec<Item>, StorageError> {
        let opts = Self::newest_first(columns([("gacha_id", gacha_id)]));
        self.query(&Query::select(ITEMS_TABLE, opts).compile()?)
    }

    /// The most recently created item with exactly this name, for
    /// duplicate-name checks. Older items with the same name are not returned.
    fn get_by_name(&self, name: &str) -> Result<Option<Item>, StorageError> {
        let opts = Self::newest_first(columns([("name", name.to_string())])).limit(1);
        self.query_one(&Query::select(ITEMS_TABLE, opts).compile()?)
    }

    /// Writes the fields present in `patch` and refreshes `updated_at`.
    ///
    /// An empty patch writes nothing and returns false, as does an unknown id.
    fn update(&mut self, id: i64, patch: &ItemPatch) -> Result<bool, StorageError> {
        if patch.is_empty() {
            return Ok(false);
        }
        if let Some(name) = &patch.name {
            Self::require_name(name)?;
        }

        let values: Columns = patch
            .columns()
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .collect();
        let columns_written = values.len();
        let stmt = Query::patch(ITEMS_TABLE, values, columns([("id", id)]), &["updated_at"])
            .compile()?;
        let affected = self.conn.execute(&stmt.sql, stmt.params())?;
        debug!(id, columns = columns_written, affected, "item updated");
        Ok(affected > 0)
    }

    fn delete(&mut self, id: i64) -> Result<bool, StorageError> {
        let stmt = Query::delete(ITEMS_TABLE, columns([("id", id)])).compile()?;
        Ok(self.conn.execute(&stmt.sql, stmt.params())? > 0)
    }

    /// Development reset: removes every item.
    fn clear(&mut self) -> Result<usize, StorageError> {
        let removed = self.conn.execute("DELETE FROM items", [])?;
        debug!(removed, "items cleared");
        Ok(removed)
    }

    fn migrate(&mut self) -> Result<MigrationOutcome, StorageError> {
        migrations::migrate_items(self.conn)
    }
}
