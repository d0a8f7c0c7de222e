//! # Unused-Modifier Projector
//!
//! Read-only projections from the roster and the closure engine.
//!
//! A modifier is *unused* when no active combo reaches it through any slot's
//! closure. The forbidden set never changes that membership; it only splits
//! the unused set into filler candidates and locked entries.

use crate::closure::ClosureEngine;
use crate::graph::compare_names;
use crate::{ComboId, Configuration, Modifier, ModifierId};
use std::collections::BTreeSet;

/// Union of the closures of every slot of every roster combo.
#[must_use]
pub fn used_modifier_set(engine: &ClosureEngine, config: &Configuration) -> BTreeSet<ModifierId> {
    engine.closure_of(
        config
            .roster_combos()
            .flat_map(|entry| entry.combo.iter().copied()),
    )
}

/// All graph modifiers minus the used set, as a set.
#[must_use]
pub fn unused_modifier_set(
    engine: &ClosureEngine,
    config: &Configuration,
) -> BTreeSet<ModifierId> {
    let used = used_modifier_set(engine, config);
    engine.graph().ids().filter(|id| !used.contains(id)).collect()
}

/// Unused modifiers in presentation order (by name, case-insensitive).
#[must_use]
pub fn unused_modifiers<'a>(
    engine: &'a ClosureEngine,
    config: &Configuration,
) -> Vec<&'a Modifier> {
    let used = used_modifier_set(engine, config);
    let mut unused: Vec<&Modifier> = engine
        .graph()
        .modifiers()
        .filter(|modifier| !used.contains(&modifier.id))
        .collect();
    unused.sort_by(|a, b| compare_names(a, b));
    unused
}

/// Closure of the four slots of the dragged combo; empty when nothing is
/// dragged or the id has no catalog entry.
#[must_use]
pub fn modifier_ids_used_by_dragged(
    engine: &ClosureEngine,
    config: &Configuration,
    dragged: Option<ComboId>,
) -> BTreeSet<ModifierId> {
    dragged
        .and_then(|id| config.combo(id))
        .map(|entry| engine.combo_closure(&entry.combo))
        .unwrap_or_default()
}

/// Add the id to the forbidden set, or remove it if present.
#[must_use]
pub fn toggle_forbidden(config: &Configuration, id: ModifierId) -> Configuration {
    let mut next = config.clone();
    if !next.forbidden_modifier_ids.remove(&id) {
        next.forbidden_modifier_ids.insert(id);
    }
    next
}

/// Unused modifiers that may be suggested as filler.
#[must_use]
pub fn filler_modifiers(engine: &ClosureEngine, config: &Configuration) -> BTreeSet<ModifierId> {
    unused_modifier_set(engine, config)
        .into_iter()
        .filter(|id| !config.forbidden_modifier_ids.contains(id))
        .collect()
}

/// Unused modifiers the user has locked.
#[must_use]
pub fn locked_unused_modifiers(
    engine: &ClosureEngine,
    config: &Configuration,
) -> BTreeSet<ModifierId> {
    unused_modifier_set(engine, config)
        .intersection(&config.forbidden_modifier_ids)
        .copied()
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogManager, ModifierGraph};

    fn m(id: u16) -> ModifierId {
        ModifierId(id)
    }

    /// Leaves 1..=6, 7 = {1, 2}, 8 = {7, 3}.
    fn engine() -> ClosureEngine {
        let graph = ModifierGraph::new([
            Modifier::leaf(m(1), "Fast"),
            Modifier::leaf(m(2), "extra Strong"),
            Modifier::leaf(m(3), "Armoured"),
            Modifier::leaf(m(4), "Vampiric"),
            Modifier::leaf(m(5), "Burning"),
            Modifier::leaf(m(6), "Chilling"),
            Modifier::crafted(m(7), "Hasted", [m(1), m(2)]),
            Modifier::crafted(m(8), "Juggernaut", [m(7), m(3)]),
        ])
        .expect("valid graph");
        ClosureEngine::new(graph)
    }

    /// Combo 1 = [8, 4, 5, 6] active; combo 2 = [1, 2, 3, 4] inactive.
    fn config() -> Configuration {
        let config = Configuration::with_template([8, 4, 5, 6].map(ModifierId));
        CatalogManager::add_combo_with(&config, [1, 2, 3, 4].map(ModifierId))
    }

    #[test]
    fn unused_is_complement_of_roster_closures() {
        let engine = engine();
        let mut config = config();
        // everything is reached through 8
        assert!(unused_modifier_set(&engine, &config).is_empty());

        config = CatalogManager::set_slot(&config, ComboId(1), 0, m(3));
        assert_eq!(
            unused_modifier_set(&engine, &config),
            BTreeSet::from([m(1), m(2), m(7), m(8)])
        );
    }

    #[test]
    fn inactive_combos_do_not_count() {
        let engine = engine();
        let mut config = config();
        config.combo_roster.clear();
        assert_eq!(unused_modifier_set(&engine, &config).len(), 8);
    }

    #[test]
    fn unused_sorted_by_name() {
        let engine = engine();
        let mut config = config();
        config.combo_roster.clear();

        let names: Vec<&str> = unused_modifiers(&engine, &config)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Armoured",
                "Burning",
                "Chilling",
                "extra Strong",
                "Fast",
                "Hasted",
                "Juggernaut",
                "Vampiric"
            ]
        );
    }

    #[test]
    fn dragged_highlight() {
        let engine = engine();
        let config = config();

        assert!(modifier_ids_used_by_dragged(&engine, &config, None).is_empty());
        assert!(modifier_ids_used_by_dragged(&engine, &config, Some(ComboId(9))).is_empty());
        assert_eq!(
            modifier_ids_used_by_dragged(&engine, &config, Some(ComboId(2))),
            BTreeSet::from([m(1), m(2), m(3), m(4)])
        );
    }

    #[test]
    fn forbidding_never_changes_unused_membership() {
        let engine = engine();
        let mut config = config();
        config.combo_roster.clear();
        let before = unused_modifier_set(&engine, &config);

        let locked = toggle_forbidden(&config, m(5));
        assert_eq!(unused_modifier_set(&engine, &locked), before);
        assert_eq!(locked_unused_modifiers(&engine, &locked), BTreeSet::from([m(5)]));
        assert!(!filler_modifiers(&engine, &locked).contains(&m(5)));
        assert_eq!(filler_modifiers(&engine, &locked).len(), before.len() - 1);

        let unlocked = toggle_forbidden(&locked, m(5));
        assert!(unlocked.forbidden_modifier_ids.is_empty());
    }

    #[test]
    fn forbidden_used_modifier_is_not_locked() {
        let engine = engine();
        let config = toggle_forbidden(&config(), m(4));
        assert!(locked_unused_modifiers(&engine, &config).is_empty());
    }
}
