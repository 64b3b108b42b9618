use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the on-device database lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// File name inside the data directory, or an absolute path.
    pub database_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "deckodecko.db".to_string(),
        }
    }
}

/// Remote catalog endpoint. An empty `base_url` disables catalog lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            table: "gacha".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Log verbosity; `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
