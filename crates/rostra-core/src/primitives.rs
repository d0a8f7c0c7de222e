//! # Fixed Primitives
//!
//! Hardcoded constants for the Rostra CORE.
//!
//! These values are compiled into the binary and are immutable at runtime.

use crate::types::ModifierId;

/// Number of slots in every combo.
pub const SLOT_COUNT: usize = 4;

/// Default catalog cap applied by outer surfaces.
///
/// The CORE never enforces a cap. It only guarantees that catalogs of at
/// least this size are supported.
pub const MAX_CATALOG_SIZE: usize = 8;

/// Slots given to a freshly added combo when the graph holds these ids.
pub const DEFAULT_COMBO_TEMPLATE: [ModifierId; SLOT_COUNT] = [
    ModifierId(4),
    ModifierId(5),
    ModifierId(7),
    ModifierId(2),
];

/// Hotkey string of a fresh configuration.
pub const DEFAULT_HOTKEY: &str = "alt + 1";

/// Magic bytes for the Rostra binary snapshot header.
///
/// - File Header = Magic Bytes ("RSTR") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"RSTR";

/// Current binary snapshot format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the binary header (magic + version).
pub const HEADER_SIZE: usize = 5;

/// Maximum accepted size of a serialized snapshot (1 MiB).
///
/// Larger payloads are rejected before decoding.
pub const MAX_SNAPSHOT_SIZE: usize = 1024 * 1024;

/// Default debounce window of the persistence coordinator, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_distinct_slots() {
        let mut seen = DEFAULT_COMBO_TEMPLATE.to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), SLOT_COUNT);
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"RSTR");
        assert_eq!(HEADER_SIZE, MAGIC_BYTES.len() + 1);
    }
}
