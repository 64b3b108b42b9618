//! SQLite connection wrapper for the bookmark store.
//!
//! Provides the [`Database`] struct that owns a `rusqlite::Connection`,
//! applies connection pragmas and bootstraps the schema on open.

use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

use super::schema;
use crate::types::errors::StorageError;

/// Owns the single on-device `rusqlite::Connection`.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path` and bootstraps the schema.
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] if the file cannot be opened or
    /// the schema statements fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)
            .map_err(|e| StorageError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory database, discarded when the `Database` is dropped.
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] if bootstrap fails.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        schema::configure(&conn).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let db = Self { conn };
        db.bootstrap()?;
        Ok(db)
    }

    /// Creates missing tables and seeds the default folder.
    ///
    /// Idempotent; the store calls it on every connection request.
    pub fn bootstrap(&self) -> Result<(), StorageError> {
        schema::bootstrap(&self.conn).map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    /// Returns the underlying `rusqlite::Connection` for repositories.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
