//! Folder Repository for Deckodecko.
//!
//! Implements `FolderRepositoryTrait`: CRUD and ordering over the `folders`
//! table, backed by SQLite via `rusqlite`.
//!
//! Folder names are not unique at the storage level; callers check with
//! [`FolderRepositoryTrait::find_by_name`] before creating. Deleting a folder
//! deletes its items through the `ON DELETE CASCADE` foreign key.

use std::collections::HashSet;

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::database::query_builder::{columns, Order, Query, SelectOptions, Statement};
use crate::database::schema::FOLDERS_TABLE;
use crate::types::errors::StorageError;
use crate::types::folder::Folder;

/// Trait defining folder operations.
pub trait FolderRepositoryTrait {
    fn create(&mut self, name: &str, sequence: i64) -> Result<i64, StorageError>;
    fn get_all(&self) -> Result<Vec<Folder>, StorageError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Folder>, StorageError>;
    fn find_by_name(&self, name: &str) -> Result<Option<Folder>, StorageError>;
    fn rename(&mut self, id: i64, new_name: &str) -> Result<bool, StorageError>;
    /// Writes each folder's position (1-based) in `ordered` as its sequence, atomically.
    fn update_sequence(&mut self, ordered: &[Folder]) -> Result<(), StorageError>;
    fn delete(&mut self, id: i64) -> Result<bool, StorageError>;
    fn next_sequence(&self) -> Result<i64, StorageError>;
    fn clear(&mut self) -> Result<usize, StorageError>;
}

/// Folder repository over a borrowed SQLite connection.
pub struct FolderRepository<'a> {
    conn: &'a Connection,
}

impl<'a> FolderRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_folder(row: &rusqlite::Row) -> rusqlite::Result<Folder> {
        Ok(Folder {
            id: row.get("id")?,
            sequence: row.get("sequence")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        })
    }

    fn query(&self, stmt: &Statement) -> Result<Vec<Folder>, StorageError> {
        let mut prepared = self.conn.prepare(&stmt.sql)?;
        let rows = prepared.query_map(stmt.params(), Self::row_to_folder)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn query_one(&self, stmt: &Statement) -> Result<Option<Folder>, StorageError> {
        Ok(self
            .conn
            .query_row(&stmt.sql, stmt.params(), Self::row_to_folder)
            .optional()?)
    }

    fn validate_name(name: &str) -> Result<&str, StorageError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(StorageError::Validation("folder name is empty".to_string()));
        }
        Ok(trimmed)
    }
}

impl<'a> FolderRepositoryTrait for FolderRepository<'a> {
    /// Inserts a folder and returns its id. The caller picks a free `sequence`.
    fn create(&mut self, name: &str, sequence: i64) -> Result<i64, StorageError> {
        let name = Self::validate_name(name)?;
        let stmt = Query::insert(
            FOLDERS_TABLE,
            vec![
                ("name".to_string(), Value::from(name.to_string())),
                ("sequence".to_string(), Value::from(sequence)),
            ],
        )
        .compile()?;
        self.conn.execute(&stmt.sql, stmt.params())?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name, sequence, "folder created");
        Ok(id)
    }

    /// All folders, by `sequence` ascending.
    fn get_all(&self) -> Result<Vec<Folder>, StorageError> {
        let opts = SelectOptions::new()
            .order_by("sequence", Order::Asc)
            .order_by("id", Order::Asc);
        self.query(&Query::select(FOLDERS_TABLE, opts).compile()?)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Folder>, StorageError> {
        let opts = SelectOptions::new().where_eq("id", id);
        self.query_one(&Query::select(FOLDERS_TABLE, opts).compile()?)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Folder>, StorageError> {
        let opts = SelectOptions::new()
            .where_eq("name", name.trim().to_string())
            .order_by("sequence", Order::Asc)
            .limit(1);
        self.query_one(&Query::select(FOLDERS_TABLE, opts).compile()?)
    }

    /// Changes `name` only. Returns false when no folder has this id.
    fn rename(&mut self, id: i64, new_name: &str) -> Result<bool, StorageError> {
        let name = Self::validate_name(new_name)?;
        let stmt = Query::update(
            FOLDERS_TABLE,
            columns([("name", name.to_string())]),
            columns([("id", id)]),
        )
        .compile()?;
        let affected = self.conn.execute(&stmt.sql, stmt.params())?;
        Ok(affected > 0)
    }

    fn update_sequence(&mut self, ordered: &[Folder]) -> Result<(), StorageError> {
        let mut seen = HashSet::with_capacity(ordered.len());
        if let Some(dup) = ordered.iter().find(|f| !seen.insert(f.id)) {
            return Err(StorageError::Validation(format!(
                "folder {} appears twice in the new order",
                dup.id
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        for (position, folder) in ordered.iter().enumerate() {
            let stmt = Query::update(
                FOLDERS_TABLE,
                columns([("sequence", position as i64 + 1)]),
                columns([("id", folder.id)]),
            )
            .compile()?;
            if tx.execute(&stmt.sql, stmt.params())? == 0 {
                // dropping `tx` rolls back the rows already written
                return Err(StorageError::NotFound(format!("folder {}", folder.id)));
            }
        }
        tx.commit()?;
        debug!(count = ordered.len(), "folder sequence updated");
        Ok(())
    }

    /// Deletes the folder and, through the cascade, its items.
    fn delete(&mut self, id: i64) -> Result<bool, StorageError> {
        let stmt = Query::delete(FOLDERS_TABLE, columns([("id", id)])).compile()?;
        let affected = self.conn.execute(&stmt.sql, stmt.params())?;
        if affected > 0 {
            debug!(id, "folder deleted");
        }
        Ok(affected > 0)
    }

    /// One past the highest sequence in use, or 1 on an empty table.
    fn next_sequence(&self) -> Result<i64, StorageError> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM folders",
            [],
            |row| row.get(0),
        )?)
    }

    /// Development reset: removes every folder (and item) and restarts ids at 1.
    fn clear(&mut self) -> Result<usize, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM folders", [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name IN ('folders', 'items')", [])?;
        tx.commit()?;
        debug!(removed, "folders cleared");
        Ok(removed)
    }
}
