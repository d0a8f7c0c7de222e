//! # Combo Catalog Manager
//!
//! CRUD over the labeled combos of a `Configuration`.
//!
//! Every operation takes the current configuration by reference and returns
//! a new value; the input is never mutated. Operations are total: an unknown
//! combo id or an out-of-range slot yields an unchanged copy.

use crate::primitives::{DEFAULT_COMBO_TEMPLATE, SLOT_COUNT};
use crate::{Combo, ComboId, Configuration, LabeledCombo, ModifierId};

/// The CatalogManager groups all catalog transforms.
pub struct CatalogManager;

impl CatalogManager {
    /// Append a new combo built from `DEFAULT_COMBO_TEMPLATE`.
    #[must_use]
    pub fn add_combo(config: &Configuration) -> Configuration {
        Self::add_combo_with(config, DEFAULT_COMBO_TEMPLATE)
    }

    /// Append a new unnamed combo built from `template`.
    ///
    /// The id is `1 + max(existing)`. The combo is not added to the roster.
    /// No cap is applied here. When no id follows the largest one the
    /// configuration is returned unchanged.
    #[must_use]
    pub fn add_combo_with(config: &Configuration, template: Combo) -> Configuration {
        let mut next = config.clone();
        if let Some(id) = config.next_combo_id() {
            next.combo_catalog.push(LabeledCombo::new(id, "", template));
        }
        next
    }

    /// Remove a combo from the catalog and the roster together.
    ///
    /// Removing the last catalog entry is refused: the configuration is
    /// returned unchanged.
    #[must_use]
    pub fn remove_combo(config: &Configuration, id: ComboId) -> Configuration {
        if config.combo_catalog.len() <= 1 {
            return config.clone();
        }
        let mut next = config.clone();
        next.combo_catalog.retain(|entry| entry.id != id);
        next.combo_roster.retain(|&roster_id| roster_id != id);
        next
    }

    /// Replace the label of a combo. The label is not validated.
    #[must_use]
    pub fn set_label(config: &Configuration, id: ComboId, label: &str) -> Configuration {
        let mut next = config.clone();
        if let Some(entry) = next.combo_catalog.iter_mut().find(|entry| entry.id == id) {
            entry.label = label.to_string();
        }
        next
    }

    /// Replace one slot of a combo. Duplicates are accepted and flagged by
    /// `is_valid`.
    #[must_use]
    pub fn set_slot(
        config: &Configuration,
        id: ComboId,
        slot: usize,
        modifier: ModifierId,
    ) -> Configuration {
        let mut next = config.clone();
        if slot < SLOT_COUNT
            && let Some(entry) = next.combo_catalog.iter_mut().find(|entry| entry.id == id)
            && let Some(target) = entry.combo.get_mut(slot)
        {
            *target = modifier;
        }
        next
    }

    /// True iff the combo exists and its four slots are pairwise distinct.
    #[must_use]
    pub fn is_valid(config: &Configuration, id: ComboId) -> bool {
        config.combo(id).is_some_and(LabeledCombo::is_valid)
    }

    /// Ids of every catalog entry with a repeated slot, in catalog order.
    #[must_use]
    pub fn invalid_combo_ids(config: &Configuration) -> Vec<ComboId> {
        config
            .combo_catalog
            .iter()
            .filter(|entry| !entry.is_valid())
            .map(|entry| entry.id)
            .collect()
    }

    /// Replace the hotkey string.
    #[must_use]
    pub fn set_hotkey(config: &Configuration, hotkey: &str) -> Configuration {
        let mut next = config.clone();
        next.hotkey = hotkey.to_string();
        next
    }

    /// Replace the tier-display preference.
    #[must_use]
    pub fn set_show_tiers(config: &Configuration, show_tiers: bool) -> Configuration {
        let mut next = config.clone();
        next.show_tiers = show_tiers;
        next
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(raw: [u16; 4]) -> Combo {
        raw.map(ModifierId)
    }

    fn three_combos() -> Configuration {
        let mut config = Configuration::default();
        config = CatalogManager::add_combo_with(&config, combo([1, 2, 3, 4]));
        config = CatalogManager::add_combo_with(&config, combo([1, 1, 2, 3]));
        config.combo_roster = vec![ComboId(3), ComboId(1)];
        config
    }

    #[test]
    fn add_assigns_next_id_and_leaves_roster() {
        let config = Configuration::default();
        let next = CatalogManager::add_combo(&config);

        assert_eq!(next.combo_catalog.len(), 2);
        let added = &next.combo_catalog[1];
        assert_eq!(added.id, ComboId(2));
        assert!(added.label.is_empty());
        assert_eq!(added.combo, DEFAULT_COMBO_TEMPLATE);
        assert_eq!(next.combo_roster, config.combo_roster);
        // input untouched
        assert_eq!(config.combo_catalog.len(), 1);
    }

    #[test]
    fn add_after_gap_uses_max_plus_one() {
        let mut config = three_combos();
        config = CatalogManager::remove_combo(&config, ComboId(2));
        let next = CatalogManager::add_combo(&config);
        assert_eq!(next.combo_catalog.last().map(|c| c.id), Some(ComboId(4)));
    }

    #[test]
    fn add_without_id_headroom_is_noop() {
        let mut config = Configuration::default();
        config
            .combo_catalog
            .push(LabeledCombo::new(ComboId(u64::MAX), "", combo([1, 2, 3, 4])));

        let next = CatalogManager::add_combo(&config);
        assert_eq!(next, config);
    }

    #[test]
    fn remove_cascades_to_roster() {
        let config = three_combos();
        let next = CatalogManager::remove_combo(&config, ComboId(3));

        assert!(next.combo(ComboId(3)).is_none());
        assert_eq!(next.combo_roster, vec![ComboId(1)]);
        let ids: Vec<ComboId> = next.catalog_ids().collect();
        assert_eq!(ids, vec![ComboId(1), ComboId(2)]);
    }

    #[test]
    fn remove_last_entry_is_noop() {
        let config = Configuration::default();
        let next = CatalogManager::remove_combo(&config, ComboId(1));
        assert_eq!(next, config);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let config = three_combos();
        assert_eq!(CatalogManager::remove_combo(&config, ComboId(42)), config);
    }

    #[test]
    fn set_label_replaces_only_target() {
        let config = three_combos();
        let next = CatalogManager::set_label(&config, ComboId(2), "Speed");

        assert_eq!(next.combo(ComboId(2)).map(|c| c.label.as_str()), Some("Speed"));
        assert_eq!(next.combo(ComboId(1)), config.combo(ComboId(1)));
    }

    #[test]
    fn set_slot_can_create_and_clear_duplicates() {
        let config = three_combos();
        assert!(CatalogManager::is_valid(&config, ComboId(2)));

        let broken = CatalogManager::set_slot(&config, ComboId(2), 3, ModifierId(1));
        assert!(!CatalogManager::is_valid(&broken, ComboId(2)));
        assert_eq!(CatalogManager::invalid_combo_ids(&broken), vec![ComboId(2), ComboId(3)]);

        let fixed = CatalogManager::set_slot(&broken, ComboId(3), 1, ModifierId(9));
        assert!(CatalogManager::is_valid(&fixed, ComboId(3)));
    }

    #[test]
    fn set_slot_out_of_range_is_noop() {
        let config = three_combos();
        assert_eq!(
            CatalogManager::set_slot(&config, ComboId(1), SLOT_COUNT, ModifierId(9)),
            config
        );
    }

    #[test]
    fn preferences_are_replaced() {
        let config = Configuration::default();
        let next = CatalogManager::set_hotkey(&config, "ctrl + shift + g");
        let next = CatalogManager::set_show_tiers(&next, true);

        assert_eq!(next.hotkey, "ctrl + shift + g");
        assert!(next.show_tiers);
        assert_eq!(next.combo_catalog, config.combo_catalog);
    }
}
