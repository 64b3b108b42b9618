use deckodecko::types::errors::*;

// === QueryError Tests ===

#[test]
fn query_error_empty_columns_display() {
    let err = QueryError::EmptyColumns("items".to_string());
    assert_eq!(err.to_string(), "No columns to write for table: items");
}

#[test]
fn query_error_empty_filter_display() {
    let err = QueryError::EmptyFilter("folders".to_string());
    assert_eq!(err.to_string(), "Empty filter for table: folders");
}

#[test]
fn query_error_invalid_identifier_display() {
    let err = QueryError::InvalidIdentifier("a b".to_string());
    assert_eq!(err.to_string(), "Invalid identifier: a b");
}

// === StorageError Tests ===

#[test]
fn storage_error_displays() {
    assert_eq!(
        StorageError::Unavailable("disk full".to_string()).to_string(),
        "Storage unavailable: disk full"
    );
    assert_eq!(
        StorageError::Validation("name".to_string()).to_string(),
        "Validation failed: name"
    );
    assert_eq!(
        StorageError::MigrationFailure("items".to_string()).to_string(),
        "Migration failed: items"
    );
    assert_eq!(
        StorageError::NotFound("folder 9".to_string()).to_string(),
        "Not found: folder 9"
    );
}

#[test]
fn storage_error_wraps_query_error() {
    let err: StorageError = QueryError::EmptyFilter("items".to_string()).into();
    assert!(matches!(err, StorageError::Query(QueryError::EmptyFilter(_))));
    assert_eq!(err.to_string(), "Query build error: Empty filter for table: items");
}

#[test]
fn unique_failure_maps_to_constraint_violation() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (x INTEGER UNIQUE); INSERT INTO t VALUES (1);")
        .unwrap();
    let err: StorageError = conn
        .execute("INSERT INTO t VALUES (1)", [])
        .unwrap_err()
        .into();
    assert!(err.is_constraint_violation(), "got {:?}", err);
    assert!(err.to_string().starts_with("Constraint violation:"));
}

#[test]
fn other_sqlite_failures_stay_database_errors() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err: StorageError = conn
        .execute("INSERT INTO missing VALUES (1)", [])
        .unwrap_err()
        .into();
    assert!(matches!(err, StorageError::Database(_)));
    assert!(!err.is_constraint_violation());
}

// === SettingsError / CatalogError Tests ===

#[test]
fn settings_error_displays() {
    assert_eq!(
        SettingsError::InvalidKey("x.y".to_string()).to_string(),
        "Invalid settings key: x.y"
    );
    assert_eq!(
        SettingsError::Io("denied".to_string()).to_string(),
        "Settings I/O error: denied"
    );
}

#[test]
fn catalog_error_displays() {
    assert_eq!(
        CatalogError::NotConfigured.to_string(),
        "Catalog endpoint not configured"
    );
    assert_eq!(
        CatalogError::Decode("eof".to_string()).to_string(),
        "Catalog decode error: eof"
    );
}

#[test]
fn errors_implement_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(StorageError::NotFound("x".to_string()));
    assert!(err.source().is_none());
}
