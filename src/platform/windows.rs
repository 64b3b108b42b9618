// Deckodecko paths on Windows

use std::env;
use std::path::PathBuf;

fn known_folder(var: &str) -> PathBuf {
    env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default\\AppData\\Roaming"))
}

/// `%APPDATA%\Deckodecko\config`
pub fn get_config_dir() -> PathBuf {
    known_folder("APPDATA").join("Deckodecko").join("config")
}

/// `%LOCALAPPDATA%\Deckodecko\data`
pub fn get_data_dir() -> PathBuf {
    known_folder("LOCALAPPDATA").join("Deckodecko").join("data")
}
