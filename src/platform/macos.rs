// Deckodecko paths on macOS

use std::env;
use std::path::PathBuf;

fn library_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp"))).join("Library")
}

/// `~/Library/Preferences/Deckodecko`
pub fn get_config_dir() -> PathBuf {
    library_dir().join("Preferences").join("Deckodecko")
}

/// `~/Library/Application Support/Deckodecko`
pub fn get_data_dir() -> PathBuf {
    library_dir().join("Application Support").join("Deckodecko")
}
