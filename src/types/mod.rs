// Deckodecko shared type definitions
// Each submodule defines types used across the store, services and RPC bridge.

pub mod bookmark;
pub mod catalog;
pub mod errors;
pub mod folder;
pub mod image;
pub mod item;
pub mod settings;
