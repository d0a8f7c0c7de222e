//! # redb-backed Configuration Storage
//!
//! A single-row table holding the current binary snapshot.

use super::ConfigStore;
use crate::formats::{configuration_from_bytes, configuration_to_bytes};
use crate::{Configuration, RostraError};
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;

/// Table for snapshots: key string -> header + postcard bytes
const SNAPSHOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

const CURRENT: &str = "current";

/// Stores the snapshot in a redb database.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RostraError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| RostraError::IoError(e.to_string()))?;

        // Initialize the table if it doesn't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| RostraError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(SNAPSHOTS)
                .map_err(|e| RostraError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| RostraError::IoError(e.to_string()))?;
        }

        Ok(Self { db })
    }
}

impl ConfigStore for RedbStore {
    fn load(&self) -> Result<Option<Configuration>, RostraError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| RostraError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(SNAPSHOTS)
            .map_err(|e| RostraError::IoError(e.to_string()))?;
        let stored = table
            .get(CURRENT)
            .map_err(|e| RostraError::IoError(e.to_string()))?;
        match stored {
            Some(guard) => configuration_from_bytes(guard.value()).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Configuration) -> Result<(), RostraError> {
        let bytes = configuration_to_bytes(snapshot)?;
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| RostraError::IoError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(SNAPSHOTS)
                .map_err(|e| RostraError::IoError(e.to_string()))?;
            table
                .insert(CURRENT, bytes.as_slice())
                .map_err(|e| RostraError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| RostraError::IoError(e.to_string()))
    }
}
