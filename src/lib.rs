//! Deckodecko: on-device bookmark storage for the gacha catalog app.
//!
//! Folders and bookmarked items live in a local SQLite database. This
//! library crate exposes all modules for use by the binaries and
//! integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
