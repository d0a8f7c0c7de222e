//! # Session Module
//!
//! A Session combines the closure engine with the live configuration, the
//! active/inactive partition and the volatile drag state.
//!
//! - The configuration is replaced, never mutated in place: each operation
//!   computes a new value and reports whether it differs from the old one
//! - The partition is kept in lock-step with the catalog and the roster
//! - Drag state is session-local and never persisted

use crate::closure::ClosureEngine;
use crate::graph::ModifierGraph;
use crate::roster::{PartitionedOrdering, RosterPosition};
use crate::validation::validate_configuration;
use crate::{
    CatalogManager, ComboId, Configuration, LabeledCombo, Modifier, ModifierId, RostraError,
    projector,
};
use std::collections::BTreeSet;

/// The live editing session.
#[derive(Debug, Clone)]
pub struct Session {
    engine: ClosureEngine,
    config: Configuration,
    ordering: PartitionedOrdering,
    dragged: Option<ComboId>,
}

impl Session {
    /// Start a session from a graph and the stored configuration.
    ///
    /// `None` (nothing stored yet) starts from a fresh configuration using the
    /// graph's default template. A stored catalog with no entries gets one
    /// fresh combo with the stored preferences kept. Structural violations
    /// are returned as errors.
    pub fn load(graph: ModifierGraph, stored: Option<Configuration>) -> Result<Self, RostraError> {
        let template = graph.default_template();
        let config = match stored {
            None => Configuration::with_template(template),
            Some(stored) if stored.combo_catalog.is_empty() => Configuration {
                forbidden_modifier_ids: stored.forbidden_modifier_ids,
                hotkey: stored.hotkey,
                show_tiers: stored.show_tiers,
                ..Configuration::with_template(template)
            },
            Some(stored) => stored,
        };
        validate_configuration(&config, &graph)?;

        Ok(Self {
            ordering: PartitionedOrdering::seed(&config),
            engine: ClosureEngine::new(graph),
            config,
            dragged: None,
        })
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    #[must_use]
    pub fn ordering(&self) -> &PartitionedOrdering {
        &self.ordering
    }

    #[must_use]
    pub fn graph(&self) -> &ModifierGraph {
        self.engine.graph()
    }

    #[must_use]
    pub fn dragged(&self) -> Option<ComboId> {
        self.dragged
    }

    #[must_use]
    pub fn combo(&self, id: ComboId) -> Option<&LabeledCombo> {
        self.config.combo(id)
    }

    #[must_use]
    pub fn is_valid(&self, id: ComboId) -> bool {
        CatalogManager::is_valid(&self.config, id)
    }

    #[must_use]
    pub fn tier(&self, id: ModifierId) -> u32 {
        self.engine.tier(id)
    }

    #[must_use]
    pub fn closure(&self, id: ModifierId) -> BTreeSet<ModifierId> {
        self.engine.closure(id)
    }

    /// Unused modifiers in presentation order.
    #[must_use]
    pub fn unused_modifiers(&self) -> Vec<&Modifier> {
        projector::unused_modifiers(&self.engine, &self.config)
    }

    #[must_use]
    pub fn unused_modifier_set(&self) -> BTreeSet<ModifierId> {
        projector::unused_modifier_set(&self.engine, &self.config)
    }

    /// Modifiers reached by the combo being dragged.
    #[must_use]
    pub fn dragged_highlight(&self) -> BTreeSet<ModifierId> {
        projector::modifier_ids_used_by_dragged(&self.engine, &self.config, self.dragged)
    }

    #[must_use]
    pub fn filler_modifiers(&self) -> BTreeSet<ModifierId> {
        projector::filler_modifiers(&self.engine, &self.config)
    }

    #[must_use]
    pub fn locked_unused_modifiers(&self) -> BTreeSet<ModifierId> {
        projector::locked_unused_modifiers(&self.engine, &self.config)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    fn replace(&mut self, next: Configuration) -> bool {
        if next == self.config {
            return false;
        }
        self.config = next;
        true
    }

    /// Append a combo built from the graph's default template.
    ///
    /// The new combo starts inactive, at the end of the inactive list.
    /// `None` when the catalog has no id left after its largest one.
    pub fn add_combo(&mut self) -> Option<ComboId> {
        let id = self.config.next_combo_id()?;
        let next = CatalogManager::add_combo_with(&self.config, self.graph().default_template());
        self.replace(next);
        self.ordering = self.ordering.with_inactive_appended(id);
        Some(id)
    }

    /// Remove a combo from catalog, roster and partition together.
    pub fn remove_combo(&mut self, id: ComboId) -> bool {
        let next = CatalogManager::remove_combo(&self.config, id);
        if !self.replace(next) {
            return false;
        }
        self.ordering = self.ordering.without(id);
        if self.dragged == Some(id) {
            self.dragged = None;
        }
        true
    }

    pub fn set_label(&mut self, id: ComboId, label: &str) -> bool {
        let next = CatalogManager::set_label(&self.config, id, label);
        self.replace(next)
    }

    /// Assign a slot. Modifiers absent from the graph are refused.
    pub fn set_slot(&mut self, id: ComboId, slot: usize, modifier: ModifierId) -> bool {
        if !self.graph().contains(modifier) {
            return false;
        }
        let next = CatalogManager::set_slot(&self.config, id, slot, modifier);
        self.replace(next)
    }

    /// Apply one drop and sync the roster with the active list.
    pub fn move_combo(
        &mut self,
        source: RosterPosition,
        destination: Option<RosterPosition>,
    ) -> bool {
        let ordering = self.ordering.moved(source, destination);
        if ordering == self.ordering {
            return false;
        }
        let mut next = self.config.clone();
        next.combo_roster = ordering.active().to_vec();
        self.ordering = ordering;
        self.replace(next);
        true
    }

    /// Record the dragged combo. Unknown ids are ignored.
    pub fn begin_drag(&mut self, id: ComboId) -> bool {
        if self.config.combo(id).is_none() {
            return false;
        }
        self.dragged = Some(id);
        true
    }

    pub fn end_drag(&mut self) {
        self.dragged = None;
    }

    /// Toggle a modifier's forbidden flag. Modifiers absent from the graph
    /// are refused.
    pub fn toggle_forbidden(&mut self, id: ModifierId) -> bool {
        if !self.graph().contains(id) {
            return false;
        }
        let next = projector::toggle_forbidden(&self.config, id);
        self.replace(next)
    }

    pub fn set_hotkey(&mut self, hotkey: &str) -> bool {
        let next = CatalogManager::set_hotkey(&self.config, hotkey);
        self.replace(next)
    }

    pub fn set_show_tiers(&mut self, show_tiers: bool) -> bool {
        let next = CatalogManager::set_show_tiers(&self.config, show_tiers);
        self.replace(next)
    }
}

// =============================================================================
// TESTS
// =============================================================================
