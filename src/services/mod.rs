// Deckodecko services
// Everything above the repositories: settings, flags, startup migrations and the bookmark views.

pub mod bookmark_view;
pub mod catalog_client;
pub mod flag_store;
pub mod migration_gate;
pub mod settings_engine;
