// Deckodecko flag store
// Small key/value strings that must survive restarts, such as one-shot migration markers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::types::errors::SettingsError;

/// Persistent string flags.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

/// Flags kept as one JSON object on disk, rewritten on every change.
pub struct FileFlagStore {
    path: PathBuf,
    flags: BTreeMap<String, String>,
}

impl FileFlagStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    ///
    /// An unreadable or malformed file is reported as an error rather than
    /// silently treated as empty, so a migration marker is never lost.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let flags = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| SettingsError::Io(format!("Failed to read flags file: {}", e)))?;
            serde_json::from_str(&content).map_err(|e| {
                SettingsError::Serialization(format!("Failed to parse flags file: {}", e))
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, flags })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::Io(format!("Failed to create flags directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(&self.flags).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize flags: {}", e))
        })?;
        fs::write(&self.path, json).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "flags write failed");
            SettingsError::Io(format!("Failed to write flags file: {}", e))
        })
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.flags.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let previous = self.flags.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist() {
            // memory must not claim what disk does not hold
            match previous {
                Some(old) => self.flags.insert(key.to_string(), old),
                None => self.flags.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if self.flags.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// In-process flags, for tests and throwaway stores.
#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    flags: BTreeMap<String, String>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.flags.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.flags.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.flags.remove(key);
        Ok(())
    }
}
