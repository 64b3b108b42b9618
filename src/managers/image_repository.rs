//! Image Repository for Deckodecko.
//!
//! Records the opaque references the device media library hands back for
//! user-picked photos. The references are stored verbatim and never resolved here.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};

use crate::database::migrations::{self, MigrationOutcome};
use crate::database::query_builder::{Columns, Order, Query, SelectOptions, Statement};
use crate::database::schema::IMAGES_TABLE;
use crate::types::errors::StorageError;
use crate::types::image::Image;

/// Trait defining image reference operations.
pub trait ImageRepositoryTrait {
    fn create(&mut self, uri: &str) -> Result<i64, StorageError>;
    fn get_all(&self, options: &SelectOptions) -> Result<Vec<Image>, StorageError>;
    fn get_latest(&self) -> Result<Option<Image>, StorageError>;
    fn delete(&mut self, filter: &Columns) -> Result<bool, StorageError>;
    fn migrate(&mut self) -> Result<MigrationOutcome, StorageError>;
}

pub struct ImageRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ImageRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_image(row: &rusqlite::Row) -> rusqlite::Result<Image> {
        Ok(Image {
            id: row.get("id")?,
            uri: row.get("uri")?,
            created_at: row.get("created_at")?,
        })
    }

    fn query(&self, stmt: &Statement) -> Result<Vec<Image>, StorageError> {
        let mut prepared = self.conn.prepare(&stmt.sql)?;
        let rows = prepared.query_map(stmt.params(), Self::row_to_image)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn with_default_sort(options: &SelectOptions) -> SelectOptions {
        let mut options = options.clone();
        if options.sort.is_empty() {
            options = options
                .order_by("created_at", Order::Desc)
                .order_by("id", Order::Desc);
        }
        options
    }
}

impl<'a> ImageRepositoryTrait for ImageRepository<'a> {
    fn create(&mut self, uri: &str) -> Result<i64, StorageError> {
        if uri.trim().is_empty() {
            return Err(StorageError::Validation("image uri is empty".to_string()));
        }
        let stmt = Query::insert(
            IMAGES_TABLE,
            vec![("uri".to_string(), Value::from(uri.to_string()))],
        )
        .compile()?;
        self.conn.execute(&stmt.sql, stmt.params())?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Rows matching `options`; newest first unless a sort is given.
    fn get_all(&self, options: &SelectOptions) -> Result<Vec<Image>, StorageError> {
        let options = Self::with_default_sort(options);
        self.query(&Query::select(IMAGES_TABLE, options).compile()?)
    }

    fn get_latest(&self) -> Result<Option<Image>, StorageError> {
        let options = Self::with_default_sort(&SelectOptions::new()).limit(1);
        let stmt = Query::select(IMAGES_TABLE, options).compile()?;
        Ok(self
            .conn
            .query_row(&stmt.sql, stmt.params(), Self::row_to_image)
            .optional()?)
    }

    fn delete(&mut self, filter: &Columns) -> Result<bool, StorageError> {
        let stmt = Query::delete(IMAGES_TABLE, filter.clone()).compile()?;
        Ok(self.conn.execute(&stmt.sql, stmt.params())? > 0)
    }

    fn migrate(&mut self) -> Result<MigrationOutcome, StorageError> {
        migrations::migrate_images(self.conn)
    }
}
