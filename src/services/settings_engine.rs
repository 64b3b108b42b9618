// Deckodecko Settings Engine
// Loads and saves AppSettings as a JSON file and updates single values by dot path.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::AppSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<AppSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &AppSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine persisting [`AppSettings`] as pretty JSON.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: AppSettings,
}

impl SettingsEngine {
    /// `path_override` replaces the default `<config dir>/settings.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));
        Self {
            config_path,
            settings: AppSettings::default(),
        }
    }

    /// Absolute database path: `storage.database_file` resolved against `data_dir`.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        let file = Path::new(&self.settings.storage.database_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            data_dir.join(file)
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the file, or falls back to defaults when it does not exist.
    fn load(&mut self) -> Result<AppSettings, SettingsError> {
        if !self.config_path.exists() {
            self.settings = AppSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::Io(format!("Failed to read config file: {}", e)))?;
        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::Serialization(format!("Failed to parse config file: {}", e))
        })?;
        debug!(path = %self.config_path.display(), "settings loaded");
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::Io(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Updates one value by dot path (`"catalog.base_url"`, `"logging.level"`)
    /// and saves. The whole document is re-validated by deserializing it back
    /// into [`AppSettings`], so a value of the wrong type is rejected.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let parts: Vec<&str> = key.split('.').collect();
        if key.is_empty() || parts.iter().any(|p| p.is_empty()) {
            return Err(SettingsError::InvalidKey(format!("'{}'", key)));
        }

        let mut document = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;

        let (last, path) = match parts.split_last() {
            Some(split) => split,
            None => return Err(SettingsError::InvalidKey(format!("'{}'", key))),
        };
        let mut current = &mut document;
        for part in path {
            current = current
                .get_mut(*part)
                .ok_or_else(|| SettingsError::InvalidKey(format!("'{}' not found", key)))?;
        }
        match current {
            Value::Object(map) if map.contains_key(*last) => {
                map.insert(last.to_string(), value);
            }
            Value::Object(_) => {
                return Err(SettingsError::InvalidKey(format!("'{}' not found", key)));
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "'{}' does not name a settings section",
                    key
                )));
            }
        }

        self.settings = serde_json::from_value(document).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = AppSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
