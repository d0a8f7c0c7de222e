//! # Application Settings
//!
//! Server and storage settings for the binary.
//!
//! ## Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. The TOML settings file (`--settings`, else `./rostra.toml` if present)
//! 3. CLI flags

use clap::ValueEnum;
use rostra_core::primitives::{DEFAULT_DEBOUNCE_MS, MAX_CATALOG_SIZE};
use rostra_core::{ConfigStore, JsonFileStore, ModifierGraph, RedbStore, RostraError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "rostra.toml";

/// Maximum settings/modifier file size (4 MB).
const MAX_INPUT_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Storage backend for the persisted configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Pretty JSON file, written via temp file + rename.
    #[default]
    File,
    /// Binary snapshot in a redb database.
    Redb,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Redb => write!(f, "redb"),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    /// Debounce window of the persistence coordinator.
    pub debounce_ms: u64,
    /// Catalog cap enforced by the HTTP API and the CLI.
    pub max_catalog_size: usize,
    /// Where the configuration is persisted.
    pub config_path: PathBuf,
    /// JSON array of modifiers.
    pub modifiers_path: PathBuf,
    pub backend: Backend,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_catalog_size: MAX_CATALOG_SIZE,
            config_path: PathBuf::from("rostra.json"),
            modifiers_path: PathBuf::from("modifiers.json"),
            backend: Backend::File,
        }
    }
}

impl AppSettings {
    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, RostraError> {
        toml::from_str(text).map_err(|e| {
            RostraError::DeserializationError(format!("Invalid settings file: {}", e))
        })
    }

    /// Load the settings file.
    ///
    /// An explicit path must exist. Without one, `rostra.toml` in the working
    /// directory is used if present, else the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, RostraError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let bytes = read_bounded(&path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| RostraError::DeserializationError(e.to_string()))?;
        Self::from_toml_str(&text)
    }

    /// `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<Arc<dyn ConfigStore>, RostraError> {
        match self.backend {
            Backend::File => Ok(Arc::new(JsonFileStore::new(&self.config_path))),
            Backend::Redb => Ok(Arc::new(RedbStore::open(&self.config_path)?)),
        }
    }

    /// Read and validate the modifier graph.
    pub fn load_graph(&self) -> Result<ModifierGraph, RostraError> {
        let bytes = read_bounded(&self.modifiers_path)?;
        ModifierGraph::from_json(&bytes)
    }
}

/// Read a file after checking its size.
fn read_bounded(path: &Path) -> Result<Vec<u8>, RostraError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        RostraError::IoError(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(RostraError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }
    std::fs::read(path)
        .map_err(|e| RostraError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}
