//! # Modifier Graph
//!
//! The static composition graph of modifiers.
//!
//! The graph is supplied externally, validated once at construction and
//! read-only for the rest of the session. All data structures use
//! `BTreeMap` for deterministic ordering.

use crate::primitives::{DEFAULT_COMBO_TEMPLATE, SLOT_COUNT};
use crate::{Combo, Modifier, ModifierId, RostraError};
use std::collections::{BTreeMap, BTreeSet};

/// A validated, acyclic modifier composition graph.
///
/// Construction rejects duplicate ids, components that name no modifier
/// and recipe cycles. Every other module may therefore assume the recipe
/// edges form a DAG.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierGraph {
    modifiers: BTreeMap<ModifierId, Modifier>,
}

/// DFS visitation state for cycle detection.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl ModifierGraph {
    /// Build a graph from a list of modifiers.
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>) -> Result<Self, RostraError> {
        let mut map = BTreeMap::new();
        for modifier in modifiers {
            let id = modifier.id;
            if map.insert(id, modifier).is_some() {
                return Err(RostraError::DuplicateModifier(id));
            }
        }

        for modifier in map.values() {
            if let Some(&component) = modifier.recipe.iter().find(|c| !map.contains_key(c)) {
                return Err(RostraError::UnknownComponent {
                    modifier: modifier.id,
                    component,
                });
            }
        }

        let graph = Self { modifiers: map };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// Parse and validate a graph from a JSON array of modifiers.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RostraError> {
        let modifiers: Vec<Modifier> = serde_json::from_slice(bytes)
            .map_err(|e| RostraError::DeserializationError(e.to_string()))?;
        Self::new(modifiers)
    }

    /// Iterative three-colour DFS over recipe edges.
    fn check_acyclic(&self) -> Result<(), RostraError> {
        let mut marks: BTreeMap<ModifierId, Mark> = BTreeMap::new();

        for &root in self.modifiers.keys() {
            if marks.contains_key(&root) {
                continue;
            }
            // (node, components still to visit)
            let mut stack: Vec<(ModifierId, Vec<ModifierId>)> = vec![(root, self.components(root))];
            marks.insert(root, Mark::InProgress);

            while let Some((node, pending)) = stack.last_mut() {
                match pending.pop() {
                    Some(next) => match marks.get(&next) {
                        Some(Mark::InProgress) => return Err(RostraError::CyclicRecipe(next)),
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(next, Mark::InProgress);
                            let components = self.components(next);
                            stack.push((next, components));
                        }
                    },
                    None => {
                        marks.insert(*node, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    fn components(&self, id: ModifierId) -> Vec<ModifierId> {
        self.recipe(id).iter().copied().collect()
    }

    /// Look up a modifier.
    #[must_use]
    pub fn get(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.get(&id)
    }

    /// Whether the graph has a modifier with this id.
    #[must_use]
    pub fn contains(&self, id: ModifierId) -> bool {
        self.modifiers.contains_key(&id)
    }

    /// The recipe of a modifier. Unknown ids have an empty recipe.
    #[must_use]
    pub fn recipe(&self, id: ModifierId) -> &BTreeSet<ModifierId> {
        static EMPTY: BTreeSet<ModifierId> = BTreeSet::new();
        self.modifiers.get(&id).map_or(&EMPTY, |m| &m.recipe)
    }

    /// All modifier ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ModifierId> + '_ {
        self.modifiers.keys().copied()
    }

    /// All modifiers in ascending id order.
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> + '_ {
        self.modifiers.values()
    }

    /// Number of modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Modifiers sorted for presentation.
    ///
    /// Names compare case-insensitively first, then exactly, then by id, so
    /// the order is total and stable.
    #[must_use]
    pub fn sorted_by_name(&self) -> Vec<&Modifier> {
        let mut sorted: Vec<&Modifier> = self.modifiers.values().collect();
        sorted.sort_by(|a, b| compare_names(a, b));
        sorted
    }

    /// The slots a freshly added combo receives.
    ///
    /// `DEFAULT_COMBO_TEMPLATE` when the graph holds all of its ids, else the
    /// smallest ids of the graph (the last one repeated if fewer than four).
    /// An empty graph falls back to the fixed template.
    #[must_use]
    pub fn default_template(&self) -> Combo {
        if DEFAULT_COMBO_TEMPLATE.iter().all(|id| self.contains(*id)) {
            return DEFAULT_COMBO_TEMPLATE;
        }
        let smallest: Vec<ModifierId> = self.ids().take(SLOT_COUNT).collect();
        match smallest.last() {
            None => DEFAULT_COMBO_TEMPLATE,
            Some(&last) => {
                let mut template = [last; SLOT_COUNT];
                for (slot, id) in template.iter_mut().zip(smallest) {
                    *slot = id;
                }
                template
            }
        }
    }
}

/// Presentation order of modifiers.
pub(crate) fn compare_names(a: &Modifier, b: &Modifier) -> std::cmp::Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: u16) -> ModifierId {
        ModifierId(id)
    }

    #[test]
    fn leaves_only_graph_is_valid() {
        let graph = ModifierGraph::new([
            Modifier::leaf(m(1), "Fast"),
            Modifier::leaf(m(2), "Armoured"),
        ])
        .expect("valid graph");

        assert_eq!(graph.len(), 2);
        assert!(graph.recipe(m(1)).is_empty());
        assert!(graph.recipe(m(99)).is_empty());
    }

    #[test]
    fn shared_component_is_not_a_cycle() {
        let graph = ModifierGraph::new([
            Modifier::leaf(m(1), "A"),
            Modifier::crafted(m(2), "B", [m(1)]),
            Modifier::crafted(m(3), "C", [m(1)]),
            Modifier::crafted(m(4), "D", [m(2), m(3)]),
        ]);
        assert!(graph.is_ok());
    }

    #[test]
    fn duplicate_id_rejected() {
        let result = ModifierGraph::new([Modifier::leaf(m(1), "A"), Modifier::leaf(m(1), "B")]);
        assert!(matches!(result, Err(RostraError::DuplicateModifier(id)) if id == m(1)));
    }

    #[test]
    fn unknown_component_rejected() {
        let result = ModifierGraph::new([Modifier::crafted(m(1), "A", [m(5)])]);
        assert!(matches!(
            result,
            Err(RostraError::UnknownComponent { modifier, component })
                if modifier == m(1) && component == m(5)
        ));
    }

    #[test]
    fn cycle_rejected() {
        let result = ModifierGraph::new([
            Modifier::crafted(m(1), "A", [m(2)]),
            Modifier::crafted(m(2), "B", [m(3)]),
            Modifier::crafted(m(3), "C", [m(1)]),
        ]);
        assert!(matches!(result, Err(RostraError::CyclicRecipe(_))));
    }

    #[test]
    fn self_recipe_rejected() {
        let result = ModifierGraph::new([Modifier::crafted(m(1), "A", [m(1)])]);
        assert!(matches!(result, Err(RostraError::CyclicRecipe(id)) if id == m(1)));
    }

    #[test]
    fn from_json_ignores_unknown_fields() {
        let json = br#"[
            {"id": 1, "name": "Fast", "recipe": [], "icon": "fast.png"},
            {"id": 2, "name": "Haste", "recipe": [1]},
            {"id": 3, "name": "Plain"}
        ]"#;
        let graph = ModifierGraph::from_json(json).expect("parse");
        assert_eq!(graph.len(), 3);
        assert!(graph.recipe(m(2)).contains(&m(1)));
        assert!(graph.get(m(3)).is_some_and(Modifier::is_leaf));
    }

    #[test]
    fn sorted_by_name_is_case_insensitive() {
        let graph = ModifierGraph::new([
            Modifier::leaf(m(1), "beta"),
            Modifier::leaf(m(2), "Alpha"),
            Modifier::leaf(m(3), "alpha"),
        ])
        .expect("valid graph");

        let order: Vec<ModifierId> = graph.sorted_by_name().iter().map(|m| m.id).collect();
        assert_eq!(order, vec![m(2), m(3), m(1)]);
    }

    #[test]
    fn default_template_prefers_fixed_ids() {
        let graph = ModifierGraph::new((1..=8).map(|i| Modifier::leaf(m(i), format!("M{i}"))))
            .expect("valid graph");
        assert_eq!(graph.default_template(), DEFAULT_COMBO_TEMPLATE);
    }

    #[test]
    fn default_template_falls_back_to_smallest_ids() {
        let graph = ModifierGraph::new([
            Modifier::leaf(m(10), "A"),
            Modifier::leaf(m(20), "B"),
            Modifier::leaf(m(30), "C"),
            Modifier::leaf(m(40), "D"),
            Modifier::leaf(m(50), "E"),
        ])
        .expect("valid graph");
        assert_eq!(graph.default_template(), [m(10), m(20), m(30), m(40)]);

        let small = ModifierGraph::new([Modifier::leaf(m(3), "A"), Modifier::leaf(m(9), "B")])
            .expect("valid graph");
        assert_eq!(small.default_template(), [m(3), m(9), m(9), m(9)]);
    }
}
