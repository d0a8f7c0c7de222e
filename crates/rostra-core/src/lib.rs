//! # rostra-core
//!
//! The deterministic combo and roster engine for Rostra - THE LOGIC.
//!
//! This crate covers:
//! - the modifier composition graph and its closures and tiers
//! - the combo catalog and the prioritised roster
//! - the unused-modifier projections
//! - the persisted snapshot format and the `ConfigStore` seam
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Has NO async, NO network dependencies (pure Rust)
//! - Uses `BTreeMap`/`BTreeSet` only, so every derived set is ordered
//! - Treats `Configuration` as a value: operations return new values
//! - Fails only when loading or saving; catalog and roster operations are total

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod closure;
pub mod formats;
pub mod graph;
pub mod primitives;
pub mod projector;
pub mod roster;
pub mod session;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Combo, ComboId, Configuration, LabeledCombo, Modifier, ModifierId, RostraError};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::CatalogManager;
pub use closure::{ClosureEngine, tier, used_modifier_closure};
pub use graph::ModifierGraph;
pub use roster::{ListId, PartitionedOrdering, RosterPosition};
pub use session::Session;
pub use validation::{validate_configuration, validate_structure};

// =============================================================================
// RE-EXPORTS: Formats and Storage
// =============================================================================

pub use formats::{
    PersistenceHeader, configuration_from_bytes, configuration_from_json, configuration_to_bytes,
    configuration_to_json, sanitize_snapshot, snapshot_checksum,
};
pub use storage::{ConfigStore, JsonFileStore, MemoryStore, RedbStore};

#[cfg(feature = "crypto-hash")]
pub use formats::snapshot_crypto_hash;
