//! # Structural Validation
//!
//! Load-time checks of a `Configuration` against a `ModifierGraph`.
//!
//! A configuration that fails here is rejected; the session never starts
//! from inconsistent data. Duplicate slots inside a combo are NOT a
//! structural violation and pass.

use crate::graph::ModifierGraph;
use crate::{ComboId, Configuration, RostraError};
use std::collections::BTreeSet;

/// Check catalog and roster consistency only.
pub fn validate_structure(config: &Configuration) -> Result<(), RostraError> {
    let mut catalog_ids = BTreeSet::new();
    for id in config.catalog_ids() {
        if !catalog_ids.insert(id) {
            return Err(RostraError::DuplicateComboId(id));
        }
    }

    let mut roster_ids: BTreeSet<ComboId> = BTreeSet::new();
    for &id in &config.combo_roster {
        if !catalog_ids.contains(&id) {
            return Err(RostraError::DanglingRosterEntry(id));
        }
        if !roster_ids.insert(id) {
            return Err(RostraError::DuplicateRosterEntry(id));
        }
    }
    Ok(())
}

/// Full load-time check: structure plus every modifier reference.
pub fn validate_configuration(
    config: &Configuration,
    graph: &ModifierGraph,
) -> Result<(), RostraError> {
    validate_structure(config)?;

    let slots = config
        .combo_catalog
        .iter()
        .flat_map(|entry| entry.combo.iter());
    for &id in slots.chain(config.forbidden_modifier_ids.iter()) {
        if !graph.contains(id) {
            return Err(RostraError::UnknownModifier(id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogManager, Modifier, ModifierId};

    fn graph() -> ModifierGraph {
        ModifierGraph::new((1..=8).map(|i| Modifier::leaf(ModifierId(i), format!("M{i}"))))
            .expect("valid graph")
    }

    #[test]
    fn fresh_configuration_is_valid() {
        assert!(validate_configuration(&Configuration::default(), &graph()).is_ok());
    }

    #[test]
    fn duplicate_slots_pass() {
        let config = Configuration::with_template([1, 1, 2, 3].map(ModifierId));
        assert!(validate_configuration(&config, &graph()).is_ok());
    }

    #[test]
    fn dangling_roster_rejected() {
        let mut config = Configuration::default();
        config.combo_roster.push(ComboId(5));
        assert!(matches!(
            validate_structure(&config),
            Err(RostraError::DanglingRosterEntry(ComboId(5)))
        ));
    }

    #[test]
    fn duplicate_roster_rejected() {
        let mut config = Configuration::default();
        config.combo_roster.push(ComboId(1));
        assert!(matches!(
            validate_structure(&config),
            Err(RostraError::DuplicateRosterEntry(ComboId(1)))
        ));
    }

    #[test]
    fn duplicate_catalog_id_rejected() {
        let mut config = CatalogManager::add_combo(&Configuration::default());
        config.combo_catalog[1].id = ComboId(1);
        assert!(matches!(
            validate_structure(&config),
            Err(RostraError::DuplicateComboId(ComboId(1)))
        ));
    }

    #[test]
    fn unknown_modifier_rejected() {
        let config = Configuration::with_template([1, 2, 3, 40].map(ModifierId));
        assert!(matches!(
            validate_configuration(&config, &graph()),
            Err(RostraError::UnknownModifier(ModifierId(40)))
        ));

        let mut config = Configuration::default();
        config.forbidden_modifier_ids.insert(ModifierId(77));
        assert!(matches!(
            validate_configuration(&config, &graph()),
            Err(RostraError::UnknownModifier(ModifierId(77)))
        ));
    }
}
