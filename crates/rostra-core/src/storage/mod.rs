//! # Storage Backends
//!
//! The `ConfigStore` seam to durable storage, plus three backends:
//! - `JsonFileStore`: the pretty JSON settings file
//! - `RedbStore`: a binary snapshot in a redb database
//! - `MemoryStore`: in-process, with injectable save failures

pub mod json_file;
pub mod redb_store;

pub use json_file::JsonFileStore;
pub use redb_store::RedbStore;

use crate::{Configuration, RostraError};
use std::sync::Mutex;

/// Load/save of the persisted configuration.
///
/// `load` returns `None` when nothing has been saved yet. `save` receives an
/// already sanitized snapshot.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<Option<Configuration>, RostraError>;

    fn save(&self, snapshot: &Configuration) -> Result<(), RostraError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    saved: Option<Configuration>,
    saves: usize,
    failures_left: usize,
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: Configuration) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                saved: Some(snapshot),
                ..MemoryState::default()
            }),
        }
    }

    /// Make the next `count` saves fail with an I/O error.
    pub fn fail_next_saves(&self, count: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.failures_left = count;
        }
    }

    /// The last successfully saved snapshot.
    #[must_use]
    pub fn saved(&self) -> Option<Configuration> {
        self.state.lock().ok().and_then(|state| state.saved.clone())
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state.lock().map(|state| state.saves).unwrap_or(0)
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<Option<Configuration>, RostraError> {
        let state = self
            .state
            .lock()
            .map_err(|e| RostraError::IoError(e.to_string()))?;
        Ok(state.saved.clone())
    }

    fn save(&self, snapshot: &Configuration) -> Result<(), RostraError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RostraError::IoError(e.to_string()))?;
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(RostraError::IoError("injected save failure".to_string()));
        }
        state.saved = Some(snapshot.clone());
        state.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load().expect("load").is_none());

        let config = Configuration::default();
        store.save(&config).expect("save");
        assert_eq!(store.load().expect("load"), Some(config));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn injected_failures_are_consumed() {
        let store = MemoryStore::new();
        store.fail_next_saves(2);
        let config = Configuration::default();

        assert!(store.save(&config).is_err());
        assert!(store.save(&config).is_err());
        assert!(store.save(&config).is_ok());
        assert_eq!(store.save_count(), 1);
    }
}
