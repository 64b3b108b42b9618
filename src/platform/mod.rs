// Deckodecko platform paths
// Per-OS configuration and data directories, selected with `cfg(target_os)`.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that replaces the data directory (database, flags).
pub const DATA_DIR_ENV: &str = "DECKODECKO_DATA_DIR";

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/deckodecko` or `~/.config/deckodecko`
/// - **macOS**: `~/Library/Preferences/Deckodecko`
/// - **Windows**: `%APPDATA%\Deckodecko\config`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Directory holding the database file and `flags.json`.
///
/// - **Linux**: `$XDG_DATA_HOME/deckodecko` or `~/.local/share/deckodecko`
/// - **macOS**: `~/Library/Application Support/Deckodecko`
/// - **Windows**: `%LOCALAPPDATA%\Deckodecko\data`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// The data directory, honouring [`DATA_DIR_ENV`] when it is set and non-empty.
pub fn resolve_data_dir() -> PathBuf {
    match env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => get_data_dir(),
    }
}
