// ─── Persisted State ───
// Selection and server configuration survive restarts as JSON files under
// the user data directory, wrapped in a schema-versioned envelope.

pub mod selection;
pub mod server_config;

#[allow(unused_imports)]
pub use selection::Selection;
#[allow(unused_imports)]
pub use server_config::{GameruleEntry, ServerConfig};

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{BuilderError, BuilderResult};

const APP_DIR_NAME: &str = "minecraft-server-builder";
const SELECTION_FILE: &str = "selection.json";
const SERVER_CONFIG_FILE: &str = "server_config.json";

/// Bump when a persisted layout changes and add a step to `migrate_step`.
const SCHEMA_VERSION: u32 = 1;

/// Envelope around every persisted file.
#[derive(Debug, Serialize, Deserialize)]
struct Persisted<T> {
    schema_version: u32,
    saved_at: DateTime<Utc>,
    data: T,
}

/// Loads and saves the durable state containers.
pub struct StateStore {
    data_dir: PathBuf,
}

impl StateStore {
    pub fn new() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: base.join(APP_DIR_NAME),
        }
    }

    /// Store rooted at an explicit directory.
    pub fn at(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn load_selection(&self) -> Selection {
        self.load(SELECTION_FILE)
    }

    pub fn save_selection(&self, selection: &Selection) -> BuilderResult<()> {
        self.save(SELECTION_FILE, selection)
    }

    pub fn load_server_config(&self) -> ServerConfig {
        self.load(SERVER_CONFIG_FILE)
    }

    pub fn save_server_config(&self, config: &ServerConfig) -> BuilderResult<()> {
        self.save(SERVER_CONFIG_FILE, config)
    }

    /// Forget everything persisted.
    pub fn clear(&self) -> BuilderResult<()> {
        for file_name in [SELECTION_FILE, SERVER_CONFIG_FILE] {
            let path = self.data_dir.join(file_name);
            if path.exists() {
                std::fs::remove_file(&path).map_err(|source| BuilderError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    fn load<T: DeserializeOwned + Default>(&self, file_name: &str) -> T {
        let path = self.data_dir.join(file_name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return T::default(),
        };

        let persisted: Persisted<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!("Corrupt state file {:?}: {}", path, e);
                return T::default();
            }
        };

        let mut value = persisted.data;
        let mut version = persisted.schema_version;
        while version < SCHEMA_VERSION {
            value = migrate_step(version, value);
            version += 1;
        }

        match serde_json::from_value(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Unreadable state file {:?}: {}", path, e);
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, file_name: &str, data: &T) -> BuilderResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| BuilderError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let persisted = Persisted {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            data,
        };
        let json = serde_json::to_string_pretty(&persisted)?;

        let path = self.data_dir.join(file_name);
        std::fs::write(&path, json).map_err(|source| BuilderError::Io { path, source })
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One migration hop: transform a `version` envelope payload into the
/// `version + 1` layout. Version 1 is the first persisted layout, so there
/// is nothing to rewrite yet.
fn migrate_step(_version: u32, value: serde_json::Value) -> serde_json::Value {
    value
}
