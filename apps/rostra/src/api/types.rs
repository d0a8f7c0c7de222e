//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use crate::coordinator::{FlushOutcome, FlushStatus};
use rostra_core::{ComboId, LabeledCombo, Modifier, ModifierId, RosterPosition, Session};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// =============================================================================
// VIEWS
// =============================================================================

/// A catalog entry as the rendering layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboView {
    pub id: ComboId,
    pub label: String,
    pub display_label: String,
    pub combo: [ModifierId; 4],
    pub valid: bool,
    pub active: bool,
}

impl ComboView {
    pub fn new(entry: &LabeledCombo, active: bool) -> Self {
        Self {
            id: entry.id,
            label: entry.label.clone(),
            display_label: entry.display_label(),
            combo: entry.combo,
            valid: entry.is_valid(),
            active,
        }
    }
}

/// The whole live configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationView {
    /// Catalog order.
    pub combos: Vec<ComboView>,
    /// Priority order.
    pub roster: Vec<ComboId>,
    /// Display order of inactive combos.
    pub inactive: Vec<ComboId>,
    pub invalid_combo_ids: Vec<ComboId>,
    pub forbidden_modifier_ids: BTreeSet<ModifierId>,
    pub hotkey: String,
    pub show_tiers: bool,
    pub dragged: Option<ComboId>,
}

impl ConfigurationView {
    pub fn from_session(session: &Session) -> Self {
        let config = session.config();
        Self {
            combos: config
                .combo_catalog
                .iter()
                .map(|entry| ComboView::new(entry, config.is_active(entry.id)))
                .collect(),
            roster: config.combo_roster.clone(),
            inactive: session.ordering().inactive().to_vec(),
            invalid_combo_ids: rostra_core::CatalogManager::invalid_combo_ids(config),
            forbidden_modifier_ids: config.forbidden_modifier_ids.clone(),
            hotkey: config.hotkey.clone(),
            show_tiers: config.show_tiers,
            dragged: session.dragged(),
        }
    }
}

/// Both roster lists, resolved to combos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterView {
    pub active: Vec<ComboView>,
    pub inactive: Vec<ComboView>,
    pub dragged: Option<ComboId>,
}

impl RosterView {
    pub fn from_session(session: &Session) -> Self {
        let resolve = |ids: &[ComboId], active: bool| -> Vec<ComboView> {
            ids.iter()
                .filter_map(|&id| session.combo(id))
                .map(|entry| ComboView::new(entry, active))
                .collect()
        };
        Self {
            active: resolve(session.ordering().active(), true),
            inactive: resolve(session.ordering().inactive(), false),
            dragged: session.dragged(),
        }
    }
}

/// A modifier with its derived tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierView {
    pub id: ModifierId,
    pub name: String,
    pub recipe: Vec<ModifierId>,
    pub tier: u32,
    pub forbidden: bool,
}

impl ModifierView {
    pub fn new(modifier: &Modifier, session: &Session) -> Self {
        Self {
            id: modifier.id,
            name: modifier.name.clone(),
            recipe: modifier.recipe.iter().copied().collect(),
            tier: session.tier(modifier.id),
            forbidden: session.config().forbidden_modifier_ids.contains(&modifier.id),
        }
    }
}

/// One entry of the unused list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedModifierView {
    pub id: ModifierId,
    pub name: String,
    pub tier: u32,
    /// Locked: never suggested as filler.
    pub forbidden: bool,
    /// Dropping the dragged combo into the roster would use this modifier.
    pub highlighted: bool,
}

/// Unused modifiers in presentation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedResponse {
    pub modifiers: Vec<UnusedModifierView>,
    pub filler_count: usize,
}

impl UnusedResponse {
    pub fn from_session(session: &Session) -> Self {
        let highlight = session.dragged_highlight();
        let forbidden = &session.config().forbidden_modifier_ids;
        let modifiers: Vec<UnusedModifierView> = session
            .unused_modifiers()
            .into_iter()
            .map(|modifier| UnusedModifierView {
                id: modifier.id,
                name: modifier.name.clone(),
                tier: session.tier(modifier.id),
                forbidden: forbidden.contains(&modifier.id),
                highlighted: highlight.contains(&modifier.id),
            })
            .collect();
        let filler_count = modifiers.iter().filter(|m| !m.forbidden).count();
        Self {
            modifiers,
            filler_count,
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRequest {
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequest {
    pub modifier_id: ModifierId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragRequest {
    pub combo_id: ComboId,
}

/// A drop. `destination: null` means the combo was released outside both
/// lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub source: RosterPosition,
    #[serde(default)]
    pub destination: Option<RosterPosition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesRequest {
    #[serde(default)]
    pub hotkey: Option<String>,
    #[serde(default)]
    pub show_tiers: Option<bool>,
}

// =============================================================================
// MUTATION / STATUS RESPONSES
// =============================================================================

/// Result of any mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub changed: bool,
    /// Id of a newly created combo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_id: Option<ComboId>,
    pub configuration: ConfigurationView,
}

impl MutationResponse {
    pub fn new(changed: bool, session: &Session) -> Self {
        Self {
            changed,
            combo_id: None,
            configuration: ConfigurationView::from_session(session),
        }
    }
}

/// Session and persistence summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub combo_count: usize,
    pub active_count: usize,
    pub inactive_count: usize,
    pub invalid_count: usize,
    pub modifier_count: usize,
    pub unused_count: usize,
    pub max_catalog_size: usize,
    pub checksum: u64,
    pub persistence: FlushStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushResponse {
    pub outcome: FlushOutcome,
    pub persistence: FlushStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub hash: String,
    pub algorithm: String,
    pub checksum: u64,
}
