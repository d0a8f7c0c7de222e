//! # Closure Engine
//!
//! Transitive closures and tiers over the modifier composition graph.
//!
//! The free functions are pure given a graph. `ClosureEngine` owns a graph
//! together with an explicit memo table filled once per session, so repeated
//! queries across many combos and slots never re-walk shared components.
//!
//! Termination relies on the graph being acyclic, which `ModifierGraph`
//! guarantees at construction.

use crate::graph::ModifierGraph;
use crate::{Combo, ModifierId};
use std::collections::{BTreeMap, BTreeSet};

/// `{id}` ∪ the closures of every component in `recipe(id)`.
///
/// Shared components are visited from each parent; no visited set is
/// needed because the graph is a DAG.
#[must_use]
pub fn used_modifier_closure(graph: &ModifierGraph, id: ModifierId) -> BTreeSet<ModifierId> {
    let mut closure = BTreeSet::from([id]);
    for &component in graph.recipe(id) {
        closure.extend(used_modifier_closure(graph, component));
    }
    closure
}

/// Composition depth: 1 for a leaf, else `1 + max(tier(component))`.
#[must_use]
pub fn tier(graph: &ModifierGraph, id: ModifierId) -> u32 {
    graph
        .recipe(id)
        .iter()
        .map(|&component| tier(graph, component))
        .max()
        .map_or(1, |deepest| deepest.saturating_add(1))
}

/// Memoized closure and tier queries over one modifier graph.
#[derive(Debug, Clone)]
pub struct ClosureEngine {
    graph: ModifierGraph,
    closures: BTreeMap<ModifierId, BTreeSet<ModifierId>>,
    tiers: BTreeMap<ModifierId, u32>,
}

impl ClosureEngine {
    /// Take ownership of a graph and fill the memo table.
    #[must_use]
    pub fn new(graph: ModifierGraph) -> Self {
        let mut engine = Self {
            graph,
            closures: BTreeMap::new(),
            tiers: BTreeMap::new(),
        };
        let ids: Vec<ModifierId> = engine.graph.ids().collect();
        for id in ids {
            engine.memoize(id);
        }
        engine
    }

    /// Components are memoized before their parents.
    fn memoize(&mut self, id: ModifierId) {
        if self.tiers.contains_key(&id) {
            return;
        }
        let components: Vec<ModifierId> = self.graph.recipe(id).iter().copied().collect();
        let mut closure = BTreeSet::from([id]);
        let mut deepest = 0u32;
        for component in components {
            self.memoize(component);
            if let Some(sub) = self.closures.get(&component) {
                closure.extend(sub.iter().copied());
            }
            deepest = deepest.max(self.tiers.get(&component).copied().unwrap_or(1));
        }
        self.closures.insert(id, closure);
        self.tiers.insert(id, deepest.saturating_add(1));
    }

    /// The graph this engine was built over.
    #[must_use]
    pub fn graph(&self) -> &ModifierGraph {
        &self.graph
    }

    /// Closure of one modifier. An id absent from the graph yields `{id}`.
    #[must_use]
    pub fn closure(&self, id: ModifierId) -> BTreeSet<ModifierId> {
        self.closures
            .get(&id)
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([id]))
    }

    /// Union of the closures of every id.
    #[must_use]
    pub fn closure_of(&self, ids: impl IntoIterator<Item = ModifierId>) -> BTreeSet<ModifierId> {
        let mut union = BTreeSet::new();
        for id in ids {
            match self.closures.get(&id) {
                Some(closure) => union.extend(closure.iter().copied()),
                None => {
                    union.insert(id);
                }
            }
        }
        union
    }

    /// Union of the closures of a combo's four slots.
    #[must_use]
    pub fn combo_closure(&self, combo: &Combo) -> BTreeSet<ModifierId> {
        self.closure_of(combo.iter().copied())
    }

    /// Tier of one modifier. An id absent from the graph is tier 1.
    #[must_use]
    pub fn tier(&self, id: ModifierId) -> u32 {
        self.tiers.get(&id).copied().unwrap_or(1)
    }
}

// =============================================================================
// TESTS
// =============================================================================
