//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Mutation handlers hold the session write lock for the whole edit and
//! schedule the resulting configuration on the persistence coordinator when
//! it changed.

use super::{
    AppState,
    types::{
        ConfigurationView, DragRequest, ErrorResponse, FlushResponse, HashResponse,
        HealthResponse, LabelRequest, ModifierView, MoveRequest, MutationResponse,
        PreferencesRequest, RosterView, SlotRequest, StatusResponse, UnusedResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rostra_core::{
    CatalogManager, ComboId, ModifierId, Session, primitives::SLOT_COUNT, sanitize_snapshot,
    snapshot_checksum, snapshot_crypto_hash,
};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

fn require_combo(session: &Session, id: ComboId) -> Result<(), ApiError> {
    if session.combo(id).is_none() {
        return Err(error(
            StatusCode::NOT_FOUND,
            format!("Combo {} not found", id),
        ));
    }
    Ok(())
}

fn require_modifier(session: &Session, id: ModifierId) -> Result<(), ApiError> {
    if !session.graph().contains(id) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("Unknown modifier {}", id),
        ));
    }
    Ok(())
}

/// Schedule a write when the edit changed the configuration.
fn commit(state: &AppState, session: &Session, changed: bool) {
    if changed {
        state.coordinator.schedule(session.config().clone());
    }
}

// =============================================================================
// READ HANDLERS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Session and persistence summary.
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let session = state.session.read().await;
    let config = session.config();
    let checksum = snapshot_checksum(&sanitize_snapshot(config))
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(StatusResponse {
        combo_count: config.combo_catalog.len(),
        active_count: session.ordering().active().len(),
        inactive_count: session.ordering().inactive().len(),
        invalid_count: CatalogManager::invalid_combo_ids(config).len(),
        modifier_count: session.graph().len(),
        unused_count: session.unused_modifier_set().len(),
        max_catalog_size: state.max_catalog_size,
        checksum,
        persistence: state.coordinator.status(),
    }))
}

/// The live configuration.
pub async fn configuration_handler(State(state): State<AppState>) -> Json<ConfigurationView> {
    let session = state.session.read().await;
    Json(ConfigurationView::from_session(&session))
}

/// Every modifier, sorted by name, with tiers.
pub async fn modifiers_handler(State(state): State<AppState>) -> Json<Vec<ModifierView>> {
    let session = state.session.read().await;
    let modifiers = session
        .graph()
        .sorted_by_name()
        .into_iter()
        .map(|modifier| ModifierView::new(modifier, &session))
        .collect();
    Json(modifiers)
}

/// Both roster lists.
pub async fn roster_handler(State(state): State<AppState>) -> Json<RosterView> {
    let session = state.session.read().await;
    Json(RosterView::from_session(&session))
}

/// Unused modifiers with locked and highlight flags.
pub async fn unused_handler(State(state): State<AppState>) -> Json<UnusedResponse> {
    let session = state.session.read().await;
    Json(UnusedResponse::from_session(&session))
}

/// BLAKE3 hash of the snapshot that would be persisted.
pub async fn hash_handler(State(state): State<AppState>) -> ApiResult<HashResponse> {
    let session = state.session.read().await;
    let snapshot = sanitize_snapshot(session.config());
    let internal =
        |e: rostra_core::RostraError| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());

    Ok(Json(HashResponse {
        hash: snapshot_crypto_hash(&snapshot).map_err(internal)?,
        algorithm: "blake3".to_string(),
        checksum: snapshot_checksum(&snapshot).map_err(internal)?,
    }))
}

// =============================================================================
// CATALOG HANDLERS
// =============================================================================

/// Add a combo. Refused with 409 once the catalog is at its cap or its ids
/// are exhausted.
pub async fn add_combo_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let mut session = state.session.write().await;
    if session.config().combo_catalog.len() >= state.max_catalog_size {
        return Err(error(
            StatusCode::CONFLICT,
            format!("Catalog is full ({} combos)", state.max_catalog_size),
        ));
    }

    let Some(id) = session.add_combo() else {
        return Err(error(StatusCode::CONFLICT, "No combo id left after the largest one"));
    };
    commit(&state, &session, true);
    tracing::info!(combo_id = %id, "Combo added");

    let mut response = MutationResponse::new(true, &session);
    response.combo_id = Some(id);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Remove a combo. Refused with 409 for the last entry.
pub async fn remove_combo_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MutationResponse> {
    let id = ComboId(id);
    let mut session = state.session.write().await;
    require_combo(&session, id)?;
    if session.config().combo_catalog.len() <= 1 {
        return Err(error(
            StatusCode::CONFLICT,
            "The catalog must keep at least one combo",
        ));
    }

    let changed = session.remove_combo(id);
    commit(&state, &session, changed);
    tracing::info!(combo_id = %id, "Combo removed");
    Ok(Json(MutationResponse::new(changed, &session)))
}

pub async fn set_label_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<LabelRequest>,
) -> ApiResult<MutationResponse> {
    let id = ComboId(id);
    let mut session = state.session.write().await;
    require_combo(&session, id)?;

    let changed = session.set_label(id, &request.label);
    commit(&state, &session, changed);
    Ok(Json(MutationResponse::new(changed, &session)))
}

pub async fn set_slot_handler(
    State(state): State<AppState>,
    Path((id, slot)): Path<(u64, usize)>,
    Json(request): Json<SlotRequest>,
) -> ApiResult<MutationResponse> {
    let id = ComboId(id);
    let mut session = state.session.write().await;
    require_combo(&session, id)?;
    if slot >= SLOT_COUNT {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("Slot {} out of range (0..{})", slot, SLOT_COUNT),
        ));
    }
    require_modifier(&session, request.modifier_id)?;

    let changed = session.set_slot(id, slot, request.modifier_id);
    commit(&state, &session, changed);
    Ok(Json(MutationResponse::new(changed, &session)))
}

// =============================================================================
// ROSTER HANDLERS
// =============================================================================

pub async fn begin_drag_handler(
    State(state): State<AppState>,
    Json(request): Json<DragRequest>,
) -> ApiResult<RosterView> {
    let mut session = state.session.write().await;
    require_combo(&session, request.combo_id)?;
    session.begin_drag(request.combo_id);
    Ok(Json(RosterView::from_session(&session)))
}

pub async fn end_drag_handler(State(state): State<AppState>) -> Json<RosterView> {
    let mut session = state.session.write().await;
    session.end_drag();
    Json(RosterView::from_session(&session))
}

/// Apply a drop. Cancelled drops answer `changed: false`.
pub async fn move_handler(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<MutationResponse> {
    let mut session = state.session.write().await;
    let changed = session.move_combo(request.source, request.destination);
    session.end_drag();
    commit(&state, &session, changed);
    Ok(Json(MutationResponse::new(changed, &session)))
}

/// Toggle a modifier's forbidden flag.
pub async fn toggle_forbidden_handler(
    State(state): State<AppState>,
    Path(id): Path<u16>,
) -> ApiResult<MutationResponse> {
    let id = ModifierId(id);
    let mut session = state.session.write().await;
    require_modifier(&session, id)?;

    let changed = session.toggle_forbidden(id);
    commit(&state, &session, changed);
    Ok(Json(MutationResponse::new(changed, &session)))
}

pub async fn preferences_handler(
    State(state): State<AppState>,
    Json(request): Json<PreferencesRequest>,
) -> ApiResult<MutationResponse> {
    let mut session = state.session.write().await;
    let mut changed = false;
    if let Some(hotkey) = request.hotkey.as_deref() {
        changed |= session.set_hotkey(hotkey);
    }
    if let Some(show_tiers) = request.show_tiers {
        changed |= session.set_show_tiers(show_tiers);
    }
    commit(&state, &session, changed);
    Ok(Json(MutationResponse::new(changed, &session)))
}

// =============================================================================
// PERSISTENCE HANDLERS
// =============================================================================

/// Write the pending snapshot now. Save failures answer 503; the change
/// stays pending.
pub async fn flush_handler(State(state): State<AppState>) -> ApiResult<FlushResponse> {
    match state.coordinator.flush().await {
        Ok(outcome) => Ok(Json(FlushResponse {
            outcome,
            persistence: state.coordinator.status(),
        })),
        Err(e) => Err(error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())),
    }
}

