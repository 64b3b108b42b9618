use rusqlite::ErrorCode;
use thiserror::Error;

// === QueryError ===

/// Errors raised while compiling a query descriptor into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An insert or update carried no columns to write.
    #[error("No columns to write for table: {0}")]
    EmptyColumns(String),
    /// A delete or conditional update carried no filter.
    #[error("Empty filter for table: {0}")]
    EmptyFilter(String),
    /// A table or column name is not a plain SQL identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

// === StorageError ===

/// Errors surfaced by the bookmark store and its repositories.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database file could not be opened or bootstrapped.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// A UNIQUE, FOREIGN KEY, CHECK or NOT NULL rule rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    /// Caller-supplied data failed a precondition before reaching SQLite.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// A table rebuild failed; the original table is left in place.
    #[error("Migration failed: {0}")]
    MigrationFailure(String),
    /// A row required by a multi-row operation does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The query builder rejected its input.
    #[error("Query build error: {0}")]
    Query(#[from] QueryError),
    /// Any other SQLite failure.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                StorageError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| e.to_string()),
                )
            }
            _ => StorageError::Database(err),
        }
    }
}

impl StorageError {
    /// True for failures caused by a constraint rule.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StorageError::ConstraintViolation(_))
    }
}

// === SettingsError ===

/// Errors related to settings and flag persistence.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing a settings file.
    #[error("Settings I/O error: {0}")]
    Io(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    Serialization(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === CatalogError ===

/// Errors from the remote read-only catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No catalog endpoint has been configured.
    #[error("Catalog endpoint not configured")]
    NotConfigured,
    /// The request could not be sent or returned a failure status.
    #[error("Catalog network error: {0}")]
    Network(String),
    /// The response body was not a list of catalog records.
    #[error("Catalog decode error: {0}")]
    Decode(String),
}
