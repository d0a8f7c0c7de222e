//! # Core Type Definitions
//!
//! This module contains all core types for the Rostra engine:
//! - Identifiers (`ModifierId`, `ComboId`)
//! - Modifier definitions (`Modifier`, `Combo`)
//! - Catalog entries (`LabeledCombo`)
//! - The persisted aggregate (`Configuration`)
//! - Error types (`RostraError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Serialize identically for identical values (no hash-ordered collections)

use crate::primitives::{DEFAULT_COMBO_TEMPLATE, DEFAULT_HOTKEY, SLOT_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable, externally assigned identifier of a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierId(pub u16);

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a catalog entry. Unique within a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComboId(pub u64);

impl ComboId {
    /// The id following this one, or `None` at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for ComboId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// MODIFIER
// =============================================================================

/// A modifier of the composition graph.
///
/// A modifier with an empty recipe is a leaf. Otherwise it is crafted from the
/// modifiers named in its recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub id: ModifierId,
    pub name: String,
    #[serde(default)]
    pub recipe: BTreeSet<ModifierId>,
}

impl Modifier {
    /// Create a leaf modifier.
    #[must_use]
    pub fn leaf(id: ModifierId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            recipe: BTreeSet::new(),
        }
    }

    /// Create a modifier crafted from the given components.
    #[must_use]
    pub fn crafted(
        id: ModifierId,
        name: impl Into<String>,
        recipe: impl IntoIterator<Item = ModifierId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            recipe: recipe.into_iter().collect(),
        }
    }

    /// Whether this modifier has no components.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.recipe.is_empty()
    }
}

// =============================================================================
// COMBO
// =============================================================================

/// A fixed 4-slot assignment of modifiers.
///
/// Duplicates are representable; see `LabeledCombo::is_valid`.
pub type Combo = [ModifierId; SLOT_COUNT];

/// A catalog entry: a combo identified and labeled independently of its slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledCombo {
    pub id: ComboId,
    #[serde(default)]
    pub label: String,
    pub combo: Combo,
}

impl LabeledCombo {
    /// Create a new catalog entry.
    #[must_use]
    pub fn new(id: ComboId, label: impl Into<String>, combo: Combo) -> Self {
        Self {
            id,
            label: label.into(),
            combo,
        }
    }

    /// True iff the four slots hold pairwise distinct modifiers.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.combo
            .iter()
            .enumerate()
            .all(|(i, slot)| !self.combo[i + 1..].contains(slot))
    }

    /// The label shown to the user. Empty labels render as `Unnamed #<id>`.
    #[must_use]
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            format!("Unnamed #{}", self.id)
        } else {
            self.label.clone()
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// The persisted aggregate.
///
/// - `combo_catalog` is in display order (insertion order, not priority)
/// - `combo_roster` is in priority order (index 0 = highest) and names only
///   catalog ids, each at most once
/// - `forbidden_modifier_ids` never changes which modifiers count as unused
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub combo_catalog: Vec<LabeledCombo>,
    pub combo_roster: Vec<ComboId>,
    #[serde(default)]
    pub forbidden_modifier_ids: BTreeSet<ModifierId>,
    #[serde(default = "default_hotkey")]
    pub hotkey: String,
    #[serde(default)]
    pub show_tiers: bool,
}

fn default_hotkey() -> String {
    DEFAULT_HOTKEY.to_string()
}

impl Default for Configuration {
    fn default() -> Self {
        Self::with_template(DEFAULT_COMBO_TEMPLATE)
    }
}

impl Configuration {
    /// A fresh configuration: one unnamed combo built from `template`, active.
    #[must_use]
    pub fn with_template(template: Combo) -> Self {
        let first = ComboId(1);
        Self {
            combo_catalog: vec![LabeledCombo::new(first, "", template)],
            combo_roster: vec![first],
            forbidden_modifier_ids: BTreeSet::new(),
            hotkey: default_hotkey(),
            show_tiers: false,
        }
    }

    /// Look up a catalog entry.
    #[must_use]
    pub fn combo(&self, id: ComboId) -> Option<&LabeledCombo> {
        self.combo_catalog.iter().find(|entry| entry.id == id)
    }

    /// Catalog ids in catalog order.
    pub fn catalog_ids(&self) -> impl Iterator<Item = ComboId> + '_ {
        self.combo_catalog.iter().map(|entry| entry.id)
    }

    /// Whether the combo is in the roster.
    #[must_use]
    pub fn is_active(&self, id: ComboId) -> bool {
        self.combo_roster.contains(&id)
    }

    /// Roster combos in priority order. Ids without a catalog entry are skipped.
    pub fn roster_combos(&self) -> impl Iterator<Item = &LabeledCombo> + '_ {
        self.combo_roster.iter().filter_map(|&id| self.combo(id))
    }

    /// The id the next added combo receives: `1 + max(existing)`, or 1 if empty.
    ///
    /// `None` when the catalog already holds `u64::MAX`.
    #[must_use]
    pub fn next_combo_id(&self) -> Option<ComboId> {
        match self.catalog_ids().max() {
            Some(max) => max.next(),
            None => Some(ComboId(1)),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Rostra system.
///
/// Structural violations are fatal at load: a session is never built from
/// an inconsistent modifier graph or configuration. Catalog and roster
/// operations themselves never fail.
#[derive(Debug, Error)]
pub enum RostraError {
    /// The modifier graph lists the same id twice.
    #[error("Duplicate modifier id in graph: {0}")]
    DuplicateModifier(ModifierId),

    /// A recipe names a component that is not in the graph.
    #[error("Modifier {modifier} lists unknown component {component}")]
    UnknownComponent {
        modifier: ModifierId,
        component: ModifierId,
    },

    /// The recipe edges contain a cycle through this modifier.
    #[error("Recipe cycle through modifier {0}")]
    CyclicRecipe(ModifierId),

    /// The catalog lists the same combo id twice.
    #[error("Duplicate combo id in catalog: {0}")]
    DuplicateComboId(ComboId),

    /// The roster names a combo that is not in the catalog.
    #[error("Roster references missing combo: {0}")]
    DanglingRosterEntry(ComboId),

    /// The roster names the same combo twice.
    #[error("Roster lists combo {0} more than once")]
    DuplicateRosterEntry(ComboId),

    /// The configuration references a modifier that is not in the graph.
    #[error("Configuration references unknown modifier: {0}")]
    UnknownModifier(ModifierId),

    /// A request was refused before reaching the core.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: [u16; 4]) -> Combo {
        raw.map(ModifierId)
    }

    #[test]
    fn distinct_slots_are_valid() {
        let combo = LabeledCombo::new(ComboId(1), "", ids([1, 2, 3, 4]));
        assert!(combo.is_valid());
    }

    #[test]
    fn repeated_slot_is_invalid() {
        let combo = LabeledCombo::new(ComboId(2), "", ids([1, 1, 2, 3]));
        assert!(!combo.is_valid());

        let combo = LabeledCombo::new(ComboId(3), "", ids([1, 2, 3, 1]));
        assert!(!combo.is_valid());
    }

    #[test]
    fn empty_label_displays_placeholder() {
        let unnamed = LabeledCombo::new(ComboId(7), "", ids([1, 2, 3, 4]));
        assert_eq!(unnamed.display_label(), "Unnamed #7");

        let named = LabeledCombo::new(ComboId(7), "Uniques", ids([1, 2, 3, 4]));
        assert_eq!(named.display_label(), "Uniques");
    }

    #[test]
    fn next_combo_id_follows_max() {
        let mut config = Configuration::default();
        assert_eq!(config.next_combo_id(), Some(ComboId(2)));

        config
            .combo_catalog
            .push(LabeledCombo::new(ComboId(9), "", ids([1, 2, 3, 4])));
        assert_eq!(config.next_combo_id(), Some(ComboId(10)));

        config.combo_catalog.clear();
        assert_eq!(config.next_combo_id(), Some(ComboId(1)));
    }

    #[test]
    fn no_next_id_after_max() {
        let mut config = Configuration::default();
        config
            .combo_catalog
            .push(LabeledCombo::new(ComboId(u64::MAX), "", ids([1, 2, 3, 4])));

        assert_eq!(ComboId(u64::MAX).next(), None);
        assert_eq!(ComboId(u64::MAX - 1).next(), Some(ComboId(u64::MAX)));
        assert_eq!(config.next_combo_id(), None);
    }

    #[test]
    fn missing_preferences_take_defaults() {
        let json = r#"{"comboCatalog":[{"id":1,"label":"","combo":[1,2,3,4]}],"comboRoster":[1]}"#;
        let config: Configuration = serde_json::from_str(json).expect("parse");

        assert_eq!(config.hotkey, DEFAULT_HOTKEY);
        assert!(!config.show_tiers);
        assert!(config.forbidden_modifier_ids.is_empty());
    }

    #[test]
    fn combo_with_wrong_slot_count_rejected() {
        let json = r#"{"comboCatalog":[{"id":1,"label":"","combo":[1,2,3]}],"comboRoster":[]}"#;
        assert!(serde_json::from_str::<Configuration>(json).is_err());
    }
}
