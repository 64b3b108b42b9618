// Deckodecko paths on Linux (XDG base directories)

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "deckodecko";

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_DIR),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            fallback
                .iter()
                .fold(PathBuf::from(home), |path, part| path.join(part))
                .join(APP_DIR)
        }
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

pub fn get_data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}
