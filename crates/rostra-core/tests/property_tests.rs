//! # Property-Based Tests
//!
//! Closure, tier, roster and snapshot invariants checked with proptest over
//! random acyclic graphs and random drop sequences.

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;
use rostra_core::{
    CatalogManager, ClosureEngine, ComboId, Configuration, ListId, Modifier, ModifierGraph,
    ModifierId, PartitionedOrdering, RosterPosition, configuration_from_json,
    configuration_to_json, projector, sanitize_snapshot, tier, used_modifier_closure,
};
use std::collections::BTreeSet;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Modifier `i` may only use components with smaller ids, so the graph is
/// acyclic by construction.
fn dag() -> impl Strategy<Value = ModifierGraph> {
    vec(vec(any::<Index>(), 0..4), 1..24).prop_map(|recipes| {
        let modifiers = recipes.iter().enumerate().map(|(i, picks)| {
            let id = ModifierId(i as u16);
            let recipe: Vec<ModifierId> = if i == 0 {
                Vec::new()
            } else {
                picks.iter().map(|pick| ModifierId(pick.index(i) as u16)).collect()
            };
            Modifier::crafted(id, format!("m{i}"), recipe)
        });
        ModifierGraph::new(modifiers).expect("acyclic by construction")
    })
}

fn position() -> impl Strategy<Value = RosterPosition> {
    (any::<bool>(), 0usize..8).prop_map(|(active, index)| {
        if active {
            RosterPosition::active(index)
        } else {
            RosterPosition::inactive(index)
        }
    })
}

fn catalog_config(size: u64, roster_len: usize) -> Configuration {
    let template = [1, 2, 3, 4].map(ModifierId);
    let mut config = Configuration::with_template(template);
    for _ in 1..size {
        config = CatalogManager::add_combo_with(&config, template);
    }
    config.combo_roster = config.catalog_ids().take(roster_len).collect();
    config
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// tier >= 1, and tier == 1 exactly for leaves.
    #[test]
    fn tier_is_one_iff_leaf(graph in dag()) {
        for modifier in graph.modifiers() {
            let t = tier(&graph, modifier.id);
            prop_assert!(t >= 1);
            prop_assert_eq!(t == 1, modifier.is_leaf());
        }
    }

    /// A crafted modifier is exactly one deeper than its deepest component.
    #[test]
    fn tier_exceeds_every_component(graph in dag()) {
        for modifier in graph.modifiers() {
            for &component in &modifier.recipe {
                prop_assert!(tier(&graph, modifier.id) > tier(&graph, component));
            }
        }
    }

    /// m is in its own closure, and the closure contains every component's
    /// closure.
    #[test]
    fn closure_contains_self_and_components(graph in dag()) {
        for modifier in graph.modifiers() {
            let closure = used_modifier_closure(&graph, modifier.id);
            prop_assert!(closure.contains(&modifier.id));
            for &component in &modifier.recipe {
                let sub = used_modifier_closure(&graph, component);
                prop_assert!(sub.is_subset(&closure));
            }
        }
    }

    /// Memoized engine agrees with the pure functions.
    #[test]
    fn engine_agrees_with_pure_functions(graph in dag()) {
        let engine = ClosureEngine::new(graph.clone());
        for id in graph.ids() {
            prop_assert_eq!(engine.closure(id), used_modifier_closure(&graph, id));
            prop_assert_eq!(engine.tier(id), tier(&graph, id));
        }
    }

    /// Dropping on the source position, or outside both lists, changes nothing.
    #[test]
    fn cancelled_moves_are_noops(size in 1u64..8, roster_len in 0usize..8, pos in position()) {
        let config = catalog_config(size, roster_len);
        let ordering = PartitionedOrdering::seed(&config);

        prop_assert_eq!(ordering.moved(pos, Some(pos)), ordering.clone());
        prop_assert_eq!(ordering.moved(pos, None), ordering);
    }

    /// Any sequence of moves keeps every catalog id in exactly one list.
    #[test]
    fn moves_preserve_partition(
        size in 1u64..8,
        roster_len in 0usize..8,
        moves in vec((position(), position()), 0..32)
    ) {
        let config = catalog_config(size, roster_len);
        let mut ordering = PartitionedOrdering::seed(&config);
        for (source, destination) in moves {
            ordering = ordering.moved(source, Some(destination));
        }

        let mut all: Vec<ComboId> = ordering.list(ListId::Active).to_vec();
        all.extend_from_slice(ordering.list(ListId::Inactive));
        let unique: BTreeSet<ComboId> = all.iter().copied().collect();
        let catalog: BTreeSet<ComboId> = config.catalog_ids().collect();

        prop_assert_eq!(all.len(), unique.len());
        prop_assert_eq!(unique, catalog);
    }

    /// Removal drops the id from both lists and keeps every other id's order.
    #[test]
    fn remove_preserves_relative_order(size in 2u64..8, roster_len in 0usize..8, pick in any::<Index>()) {
        let mut config = catalog_config(size, roster_len);
        config.combo_roster.reverse();
        let ids: Vec<ComboId> = config.catalog_ids().collect();
        let target = ids[pick.index(ids.len())];

        let next = CatalogManager::remove_combo(&config, target);

        let expected_catalog: Vec<ComboId> = ids.iter().copied().filter(|&id| id != target).collect();
        let expected_roster: Vec<ComboId> =
            config.combo_roster.iter().copied().filter(|&id| id != target).collect();
        prop_assert_eq!(next.catalog_ids().collect::<Vec<_>>(), expected_catalog);
        prop_assert_eq!(next.combo_roster, expected_roster);
    }

    /// Unused = all ids minus the union of roster closures; forbidding never
    /// changes it.
    #[test]
    fn unused_is_exact_complement(graph in dag(), slots in vec(any::<Index>(), 4), forbid in any::<Index>()) {
        let ids: Vec<ModifierId> = graph.ids().collect();
        let combo = [0, 1, 2, 3].map(|i| ids[slots[i].index(ids.len())]);
        let config = Configuration::with_template(combo);
        let engine = ClosureEngine::new(graph.clone());

        let mut used = BTreeSet::new();
        for slot in combo {
            used.extend(used_modifier_closure(&graph, slot));
        }
        let expected: BTreeSet<ModifierId> = graph.ids().filter(|id| !used.contains(id)).collect();
        let unused = projector::unused_modifier_set(&engine, &config);
        prop_assert_eq!(&unused, &expected);

        let locked = projector::toggle_forbidden(&config, ids[forbid.index(ids.len())]);
        prop_assert_eq!(projector::unused_modifier_set(&engine, &locked), expected);
    }

    /// load -> save with no edits reproduces the persisted bytes.
    #[test]
    fn snapshot_roundtrip_is_byte_identical(
        size in 1u64..8,
        roster_len in 0usize..8,
        edits in vec((0usize..4, 1u16..6), 0..6),
        show_tiers in any::<bool>()
    ) {
        let mut config = catalog_config(size, roster_len);
        for (slot, modifier) in edits {
            config = CatalogManager::set_slot(&config, ComboId(1), slot, ModifierId(modifier));
        }
        config = CatalogManager::set_show_tiers(&config, show_tiers);

        let first = configuration_to_json(&sanitize_snapshot(&config)).expect("serialize");
        let loaded = configuration_from_json(&first).expect("parse");
        let second = configuration_to_json(&sanitize_snapshot(&loaded)).expect("serialize");
        prop_assert_eq!(first, second);
    }
}
