//! # Roster Engine
//!
//! The partition of catalog ids into an ordered active list (the roster,
//! index 0 = highest priority) and an ordered inactive list.
//!
//! Both lists live in one `PartitionedOrdering` value, so every id is in
//! exactly one of them by construction. The only reordering primitive is
//! `moved`: a single splice-out followed by a splice-in.

use crate::{ComboId, Configuration};
use serde::{Deserialize, Serialize};

/// Which of the two lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListId {
    Active,
    Inactive,
}

/// An index into one of the two lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterPosition {
    pub list: ListId,
    pub index: usize,
}

impl RosterPosition {
    #[must_use]
    pub const fn active(index: usize) -> Self {
        Self {
            list: ListId::Active,
            index,
        }
    }

    #[must_use]
    pub const fn inactive(index: usize) -> Self {
        Self {
            list: ListId::Inactive,
            index,
        }
    }
}

/// Active and inactive combo ids, disjoint and each ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionedOrdering {
    active: Vec<ComboId>,
    inactive: Vec<ComboId>,
}

impl PartitionedOrdering {
    /// Active = the roster; inactive = catalog ids not in the roster, in
    /// catalog order.
    #[must_use]
    pub fn seed(config: &Configuration) -> Self {
        let active = config.combo_roster.clone();
        let inactive = config
            .catalog_ids()
            .filter(|id| !active.contains(id))
            .collect();
        Self { active, inactive }
    }

    /// The ids of one list.
    #[must_use]
    pub fn list(&self, list: ListId) -> &[ComboId] {
        match list {
            ListId::Active => &self.active,
            ListId::Inactive => &self.inactive,
        }
    }

    fn list_mut(&mut self, list: ListId) -> &mut Vec<ComboId> {
        match list {
            ListId::Active => &mut self.active,
            ListId::Inactive => &mut self.inactive,
        }
    }

    /// The roster, highest priority first.
    #[must_use]
    pub fn active(&self) -> &[ComboId] {
        &self.active
    }

    /// Inactive catalog ids in display order.
    #[must_use]
    pub fn inactive(&self) -> &[ComboId] {
        &self.inactive
    }

    /// Apply one drop.
    ///
    /// - `destination == None` (dropped outside both lists) is a no-op
    /// - same list and same index is a no-op
    /// - a source index with no element is a no-op
    ///
    /// Otherwise the id is removed at `source.index` and inserted at
    /// `destination.index` of the destination list as it stands after the
    /// removal, clamped to its length.
    #[must_use]
    pub fn moved(&self, source: RosterPosition, destination: Option<RosterPosition>) -> Self {
        let Some(destination) = destination else {
            return self.clone();
        };
        if source == destination || source.index >= self.list(source.list).len() {
            return self.clone();
        }

        let mut next = self.clone();
        let id = next.list_mut(source.list).remove(source.index);
        let target = next.list_mut(destination.list);
        let index = destination.index.min(target.len());
        target.insert(index, id);
        next
    }

    /// Append a new catalog id to the end of the inactive list.
    #[must_use]
    pub fn with_inactive_appended(&self, id: ComboId) -> Self {
        let mut next = self.without(id);
        next.inactive.push(id);
        next
    }

    /// Drop an id from whichever list holds it.
    #[must_use]
    pub fn without(&self, id: ComboId) -> Self {
        let mut next = self.clone();
        next.active.retain(|&other| other != id);
        next.inactive.retain(|&other| other != id);
        next
    }

    /// Where an id currently sits.
    #[must_use]
    pub fn position_of(&self, id: ComboId) -> Option<RosterPosition> {
        if let Some(index) = self.active.iter().position(|&other| other == id) {
            return Some(RosterPosition::active(index));
        }
        self.inactive
            .iter()
            .position(|&other| other == id)
            .map(RosterPosition::inactive)
    }

    /// Number of ids across both lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogManager, Combo, ModifierId};

    fn ids(raw: &[u64]) -> Vec<ComboId> {
        raw.iter().copied().map(ComboId).collect()
    }

    fn ordering(active: &[u64], inactive: &[u64]) -> PartitionedOrdering {
        PartitionedOrdering {
            active: ids(active),
            inactive: ids(inactive),
        }
    }

    #[test]
    fn seed_splits_catalog() {
        let template: Combo = [1, 2, 3, 4].map(ModifierId);
        let mut config = Configuration::default();
        config = CatalogManager::add_combo_with(&config, template);
        config = CatalogManager::add_combo_with(&config, template);
        config.combo_roster = ids(&[3, 1]);

        let seeded = PartitionedOrdering::seed(&config);
        assert_eq!(seeded.active(), ids(&[3, 1]).as_slice());
        assert_eq!(seeded.inactive(), ids(&[2]).as_slice());
    }

    #[test]
    fn same_position_is_noop() {
        let before = ordering(&[3, 1, 4], &[2]);
        for index in 0..3 {
            let pos = RosterPosition::active(index);
            assert_eq!(before.moved(pos, Some(pos)), before);
        }
    }

    #[test]
    fn drop_outside_is_noop() {
        let before = ordering(&[3, 1], &[2]);
        assert_eq!(before.moved(RosterPosition::active(0), None), before);
    }

    #[test]
    fn out_of_range_source_is_noop() {
        let before = ordering(&[3, 1], &[2]);
        let after = before.moved(RosterPosition::inactive(5), Some(RosterPosition::active(0)));
        assert_eq!(after, before);
    }

    #[test]
    fn roster_to_inactive_front() {
        let before = ordering(&[3, 1], &[2]);
        let after = before.moved(RosterPosition::active(1), Some(RosterPosition::inactive(0)));
        assert_eq!(after, ordering(&[3], &[1, 2]));
    }

    #[test]
    fn same_list_forward_move_uses_post_removal_index() {
        let before = ordering(&[1, 2, 3, 4], &[]);
        let after = before.moved(RosterPosition::active(0), Some(RosterPosition::active(2)));
        assert_eq!(after, ordering(&[2, 3, 1, 4], &[]));

        let back = after.moved(RosterPosition::active(2), Some(RosterPosition::active(0)));
        assert_eq!(back, before);
    }

    #[test]
    fn moving_only_element_empties_source() {
        let before = ordering(&[7], &[2, 5]);
        let after = before.moved(RosterPosition::active(0), Some(RosterPosition::inactive(1)));
        assert_eq!(after, ordering(&[], &[2, 7, 5]));
        assert!(after.active().is_empty());
    }

    #[test]
    fn destination_past_end_appends() {
        let before = ordering(&[1], &[2, 3]);
        let after = before.moved(RosterPosition::inactive(0), Some(RosterPosition::active(9)));
        assert_eq!(after, ordering(&[1, 2], &[3]));
    }

    #[test]
    fn membership_helpers() {
        let before = ordering(&[1, 3], &[2]);
        let appended = before.with_inactive_appended(ComboId(4));
        assert_eq!(appended.inactive(), ids(&[2, 4]).as_slice());
        assert_eq!(appended.position_of(ComboId(4)), Some(RosterPosition::inactive(1)));
        assert_eq!(appended.position_of(ComboId(3)), Some(RosterPosition::active(1)));

        let removed = appended.without(ComboId(3));
        assert_eq!(removed.active(), ids(&[1]).as_slice());
        assert_eq!(removed.position_of(ComboId(3)), None);
        assert_eq!(removed.len(), 3);
    }
}
