//! JSON settings file store.

use super::ConfigStore;
use crate::formats::{configuration_from_json, configuration_to_json};
use crate::{Configuration, RostraError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores the snapshot as pretty JSON at `path`.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a reader never observes a partial file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<Option<Configuration>, RostraError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => configuration_from_json(&bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RostraError::IoError(e.to_string())),
        }
    }

    fn save(&self, snapshot: &Configuration) -> Result<(), RostraError> {
        let bytes = configuration_to_json(snapshot)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RostraError::IoError(e.to_string()))?;
        }
        let temp = self.temp_path();
        std::fs::write(&temp, &bytes).map_err(|e| RostraError::IoError(e.to_string()))?;
        std::fs::rename(&temp, &self.path).map_err(|e| RostraError::IoError(e.to_string()))
    }
}
