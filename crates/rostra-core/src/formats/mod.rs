//! # Formats
//!
//! Snapshot serialization. File and database I/O lives in `storage`.

pub mod persistence;

pub use persistence::{
    PersistenceHeader, configuration_from_bytes, configuration_from_json, configuration_to_bytes,
    configuration_to_json, sanitize_snapshot, snapshot_checksum,
};

#[cfg(feature = "crypto-hash")]
pub use persistence::snapshot_crypto_hash;
