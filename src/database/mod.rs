//! Deckodecko database layer.
//!
//! SQLite connection management, schema bootstrap, table-shape migrations
//! and the parameterised query builder the repositories are written on.
//!
//! # Usage
//!
//! ```no_run
//! use deckodecko::database::Store;
//! use deckodecko::managers::folder_repository::{FolderRepository, FolderRepositoryTrait};
//!
//! # async fn demo() -> Result<(), deckodecko::types::errors::StorageError> {
//! let store = Store::file("deckodecko.db");
//! let folders = store.run(|conn| FolderRepository::new(conn).get_all()).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;
pub mod query_builder;
pub mod schema;
pub mod store;

pub use connection::Database;
pub use store::{SharedDatabase, Store, StoreLocation};
