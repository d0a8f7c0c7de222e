//! # Persistence Format
//!
//! Snapshot preparation and serialization for `Configuration` values.
//!
//! Two encodings share one sanitized snapshot:
//! - JSON (pretty, deterministic field and set order) for the settings file
//! - Binary: Header (5 bytes) + postcard payload, for the embedded database
//!   - 4 bytes: Magic ("RSTR")
//!   - 1 byte: Version
//!
//! Size and header are validated before any payload decoding.

use crate::primitives::{FORMAT_VERSION, HEADER_SIZE, MAGIC_BYTES, MAX_SNAPSHOT_SIZE};
use crate::{Configuration, RostraError};

// =============================================================================
// SNAPSHOT PREPARATION
// =============================================================================

/// The value that is actually written to a store.
///
/// Combos with a repeated slot are dropped from the catalog, and their ids
/// are dropped from the roster so the saved roster still resolves entirely
/// in the saved catalog. The live configuration keeps both.
#[must_use]
pub fn sanitize_snapshot(config: &Configuration) -> Configuration {
    let mut snapshot = config.clone();
    snapshot.combo_catalog.retain(|entry| entry.is_valid());
    let kept: Vec<_> = snapshot.catalog_ids().collect();
    snapshot.combo_roster.retain(|id| kept.contains(id));
    snapshot
}

// =============================================================================
// JSON
// =============================================================================

/// Serialize to pretty JSON terminated by a newline.
pub fn configuration_to_json(config: &Configuration) -> Result<Vec<u8>, RostraError> {
    let mut bytes = serde_json::to_vec_pretty(config)
        .map_err(|e| RostraError::SerializationError(e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse a configuration from JSON.
pub fn configuration_from_json(bytes: &[u8]) -> Result<Configuration, RostraError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(RostraError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }
    serde_json::from_slice(bytes).map_err(|e| RostraError::DeserializationError(e.to_string()))
}

// =============================================================================
// BINARY HEADER
// =============================================================================

/// The header that precedes every binary snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), RostraError> {
        if &self.magic != MAGIC_BYTES {
            return Err(RostraError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(RostraError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [a, b, c, d] = self.magic;
        [a, b, c, d, self.version]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RostraError> {
        match bytes {
            [a, b, c, d, version, ..] => Ok(Self {
                magic: [*a, *b, *c, *d],
                version: *version,
            }),
            _ => Err(RostraError::DeserializationError(
                "Header too short".to_string(),
            )),
        }
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// BINARY
// =============================================================================

/// Serialize to header + postcard payload.
pub fn configuration_to_bytes(config: &Configuration) -> Result<Vec<u8>, RostraError> {
    let payload =
        postcard::to_stdvec(config).map_err(|e| RostraError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&PersistenceHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Decode a binary snapshot after validating size and header.
pub fn configuration_from_bytes(bytes: &[u8]) -> Result<Configuration, RostraError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(RostraError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_SIZE..).unwrap_or_default();
    postcard::from_bytes(payload).map_err(|e| {
        RostraError::DeserializationError(format!("Failed to decode snapshot: {}", e))
    })
}

// =============================================================================
// CHECKSUMS
// =============================================================================

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the canonical JSON encoding.
///
/// Detects accidental change only; NOT collision resistant.
pub fn snapshot_checksum(config: &Configuration) -> Result<u64, RostraError> {
    let bytes = configuration_to_json(config)?;
    Ok(bytes.iter().fold(FNV_OFFSET, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    }))
}

/// BLAKE3 hex digest of the canonical JSON encoding.
///
/// Only available with the `crypto-hash` feature enabled.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_crypto_hash(config: &Configuration) -> Result<String, RostraError> {
    let bytes = configuration_to_json(config)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogManager, ComboId, ModifierId};

    fn mixed_config() -> Configuration {
        let config = Configuration::with_template([1, 2, 3, 4].map(ModifierId));
        let mut config = CatalogManager::add_combo_with(&config, [1, 1, 2, 3].map(ModifierId));
        config.combo_roster = vec![ComboId(2), ComboId(1)];
        config.forbidden_modifier_ids.insert(ModifierId(9));
        config
    }

    #[test]
    fn sanitize_drops_invalid_from_catalog_and_roster() {
        let config = mixed_config();
        let snapshot = sanitize_snapshot(&config);

        assert_eq!(snapshot.combo_catalog.len(), 1);
        assert!(snapshot.combo(ComboId(2)).is_none());
        assert_eq!(snapshot.combo_roster, vec![ComboId(1)]);
        // live value untouched
        assert!(config.combo(ComboId(2)).is_some());
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_snapshot(&mixed_config());
        assert_eq!(sanitize_snapshot(&once), once);
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let json = configuration_to_json(&Configuration::default()).expect("serialize");
        let text = String::from_utf8(json).expect("utf8");
        for key in [
            "comboCatalog",
            "comboRoster",
            "forbiddenModifierIds",
            "hotkey",
            "showTiers",
        ] {
            assert!(text.contains(key), "missing {key}");
        }
    }

    #[test]
    fn json_save_load_save_is_byte_identical() {
        let snapshot = sanitize_snapshot(&mixed_config());
        let first = configuration_to_json(&snapshot).expect("serialize");
        let loaded = configuration_from_json(&first).expect("parse");
        let second = configuration_to_json(&sanitize_snapshot(&loaded)).expect("serialize");
        assert_eq!(first, second);
    }

    #[test]
    fn binary_save_load_save_is_byte_identical() {
        let config = mixed_config();
        let first = configuration_to_bytes(&config).expect("serialize");
        let loaded = configuration_from_bytes(&first).expect("decode");
        assert_eq!(loaded, config);
        assert_eq!(configuration_to_bytes(&loaded).expect("serialize"), first);
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = configuration_to_bytes(&Configuration::default()).expect("serialize");
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(configuration_from_bytes(&bytes).is_err());
    }

    #[test]
    fn wrong_version_rejected() {
        let mut bytes = configuration_to_bytes(&Configuration::default()).expect("serialize");
        bytes[4] = FORMAT_VERSION + 1;
        assert!(configuration_from_bytes(&bytes).is_err());
    }

    #[test]
    fn short_data_rejected() {
        assert!(configuration_from_bytes(b"RST").is_err());
    }

    #[test]
    fn checksum_tracks_content() {
        let config = Configuration::default();
        let same = snapshot_checksum(&config.clone()).expect("checksum");
        assert_eq!(snapshot_checksum(&config).expect("checksum"), same);

        let renamed = CatalogManager::set_label(&config, ComboId(1), "main");
        assert_ne!(snapshot_checksum(&renamed).expect("checksum"), same);
    }

    #[cfg(feature = "crypto-hash")]
    #[test]
    fn crypto_hash_is_hex() {
        let hash = snapshot_crypto_hash(&Configuration::default()).expect("hash");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
