//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Read commands load the session and print. Mutating commands apply one
//! edit, hand the result to a `PersistenceCoordinator` and close it with
//! `ClosePolicy::Flush`, so the edit is written before the process exits.

use crate::api::{self, AppState, ConfigurationView};
use crate::coordinator::{ClosePolicy, FlushOutcome, PersistenceCoordinator};
use crate::settings::AppSettings;
use rostra_core::{
    CatalogManager, ComboId, ConfigStore, Configuration, ListId, ModifierId, RosterPosition,
    RostraError, Session, sanitize_snapshot, snapshot_checksum, snapshot_crypto_hash,
};
use std::sync::Arc;

// =============================================================================
// SESSION LOADING
// =============================================================================

/// A session together with the store it came from.
pub struct LoadedSession {
    pub session: Session,
    pub store: Arc<dyn ConfigStore>,
    /// What the store held at load time.
    pub stored: Option<Configuration>,
}

/// Load the modifier graph, open the store and start a session.
pub fn load_session(settings: &AppSettings) -> Result<LoadedSession, RostraError> {
    let graph = settings.load_graph()?;
    let store = settings.open_store()?;
    let stored = store.load()?;
    let session = Session::load(graph, stored.clone())?;
    Ok(LoadedSession {
        session,
        store,
        stored,
    })
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(settings: &AppSettings) -> Result<(), RostraError> {
    let LoadedSession {
        session,
        store,
        stored,
    } = load_session(settings)?;
    let coordinator = PersistenceCoordinator::spawn(store, settings.debounce(), stored);

    println!("Rostra Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:   {}", settings.bind_address());
    println!("  Backend:   {}", settings.backend);
    println!("  Config:    {:?}", settings.config_path);
    println!("  Modifiers: {:?}", settings.modifiers_path);
    println!("  Debounce:  {} ms", settings.debounce_ms);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(session, coordinator, settings.max_catalog_size);
    api::run_server(&settings.bind_address(), state).await
}

// =============================================================================
// READ COMMANDS
// =============================================================================

/// Show catalog, roster and checksum.
pub fn cmd_status(settings: &AppSettings, json_mode: bool) -> Result<(), RostraError> {
    let LoadedSession { session, .. } = load_session(settings)?;
    let config = session.config();
    let checksum = snapshot_checksum(&sanitize_snapshot(config))?;

    if json_mode {
        let output = serde_json::json!({
            "config_path": settings.config_path.to_string_lossy(),
            "backend": settings.backend.to_string(),
            "checksum": checksum,
            "unused_count": session.unused_modifier_set().len(),
            "configuration": ConfigurationView::from_session(&session),
        });
        print_json(&output);
        return Ok(());
    }

    println!("Rostra Status");
    println!("=============");
    println!("Config:   {:?}", settings.config_path);
    println!("Backend:  {}", settings.backend);
    println!("Checksum: {:016x}", checksum);
    println!();
    println!("Roster (highest priority first):");
    for (rank, entry) in config.roster_combos().enumerate() {
        print_combo(&session, rank + 1, entry.id);
    }
    println!();
    println!("Inactive:");
    for &id in session.ordering().inactive() {
        print_combo(&session, 0, id);
    }
    println!();
    println!(
        "Unused modifiers: {} ({} forbidden)",
        session.unused_modifier_set().len(),
        session.locked_unused_modifiers().len()
    );
    println!("Hotkey:     {}", config.hotkey);
    println!("Show tiers: {}", config.show_tiers);

    Ok(())
}

fn print_combo(session: &Session, rank: usize, id: ComboId) {
    let Some(entry) = session.combo(id) else {
        return;
    };
    let slots: Vec<String> = entry
        .combo
        .iter()
        .map(|&slot| {
            session
                .graph()
                .get(slot)
                .map_or_else(|| slot.to_string(), |m| m.name.clone())
        })
        .collect();
    let flag = if entry.is_valid() { "" } else { "  [duplicate slots]" };
    let prefix = if rank > 0 {
        format!("{:>3}.", rank)
    } else {
        "   -".to_string()
    };
    println!(
        "{} #{} {}: {}{}",
        prefix,
        entry.id,
        entry.display_label(),
        slots.join(", "),
        flag
    );
}

/// List every modifier with its tier.
pub fn cmd_modifiers(settings: &AppSettings, json_mode: bool) -> Result<(), RostraError> {
    let LoadedSession { session, .. } = load_session(settings)?;
    let modifiers: Vec<api::ModifierView> = session
        .graph()
        .sorted_by_name()
        .into_iter()
        .map(|modifier| api::ModifierView::new(modifier, &session))
        .collect();

    if json_mode {
        print_json(&modifiers);
        return Ok(());
    }

    for modifier in &modifiers {
        let lock = if modifier.forbidden { " (forbidden)" } else { "" };
        println!(
            "{:>5}  T{}  {}{}",
            modifier.id, modifier.tier, modifier.name, lock
        );
    }
    Ok(())
}

/// List modifiers no roster combo uses.
pub fn cmd_unused(settings: &AppSettings, json_mode: bool) -> Result<(), RostraError> {
    let LoadedSession { session, .. } = load_session(settings)?;
    let unused = api::UnusedResponse::from_session(&session);

    if json_mode {
        print_json(&unused);
        return Ok(());
    }

    for modifier in &unused.modifiers {
        let lock = if modifier.forbidden { " (forbidden)" } else { "" };
        println!("{:>5}  {}{}", modifier.id, modifier.name, lock);
    }
    println!();
    println!(
        "{} unused, {} available as filler",
        unused.modifiers.len(),
        unused.filler_count
    );
    Ok(())
}

/// BLAKE3 hash of the snapshot as it would be persisted.
pub fn cmd_hash(settings: &AppSettings, json_mode: bool) -> Result<(), RostraError> {
    let LoadedSession { session, .. } = load_session(settings)?;
    let snapshot = sanitize_snapshot(session.config());
    let hash = snapshot_crypto_hash(&snapshot)?;
    let checksum = snapshot_checksum(&snapshot)?;

    if json_mode {
        print_json(&serde_json::json!({
            "hash": hash,
            "algorithm": "blake3",
            "checksum": checksum,
        }));
    } else {
        println!("BLAKE3: {}", hash);
        println!("FNV-1a: {:016x}", checksum);
    }
    Ok(())
}

// =============================================================================
// MUTATING COMMANDS
// =============================================================================

/// Apply one edit and write the result through the coordinator.
async fn mutate<F>(settings: &AppSettings, json_mode: bool, edit: F) -> Result<(), RostraError>
where
    F: FnOnce(&mut Session) -> Result<bool, RostraError>,
{
    let LoadedSession {
        mut session,
        store,
        stored,
    } = load_session(settings)?;
    let changed = edit(&mut session)?;

    let coordinator = PersistenceCoordinator::spawn(store, settings.debounce(), stored);
    if changed {
        coordinator.schedule(session.config().clone());
    }
    let outcome = coordinator.close(ClosePolicy::Flush).await?;

    if json_mode {
        print_json(&serde_json::json!({
            "changed": changed,
            "outcome": outcome,
            "configuration": ConfigurationView::from_session(&session),
        }));
        return Ok(());
    }

    match (changed, outcome) {
        (false, _) => println!("No change"),
        (true, FlushOutcome::Written) => println!("Saved to {:?}", settings.config_path),
        (true, other) => println!("Updated ({:?})", other),
    }
    let invalid = CatalogManager::invalid_combo_ids(session.config());
    if !invalid.is_empty() {
        println!(
            "Warning: combos with duplicate slots are not saved: {:?}",
            invalid.iter().map(|id| id.0).collect::<Vec<_>>()
        );
    }
    Ok(())
}

fn require_combo(session: &Session, id: ComboId) -> Result<(), RostraError> {
    if session.combo(id).is_none() {
        return Err(RostraError::InvalidInput(format!("Combo {} not found", id)));
    }
    Ok(())
}

fn require_modifier(session: &Session, id: ModifierId) -> Result<(), RostraError> {
    if !session.graph().contains(id) {
        return Err(RostraError::InvalidInput(format!("Unknown modifier {}", id)));
    }
    Ok(())
}

pub async fn cmd_add(settings: &AppSettings, json_mode: bool) -> Result<(), RostraError> {
    let cap = settings.max_catalog_size;
    mutate(settings, json_mode, |session| {
        if session.config().combo_catalog.len() >= cap {
            return Err(RostraError::InvalidInput(format!(
                "Catalog is full ({} combos)",
                cap
            )));
        }
        let id = session.add_combo().ok_or_else(|| {
            RostraError::InvalidInput("No combo id left after the largest one".to_string())
        })?;
        if !json_mode {
            println!("Added combo #{}", id);
        }
        Ok(true)
    })
    .await
}

pub async fn cmd_remove(
    settings: &AppSettings,
    json_mode: bool,
    id: u64,
) -> Result<(), RostraError> {
    let id = ComboId(id);
    mutate(settings, json_mode, |session| {
        require_combo(session, id)?;
        if session.config().combo_catalog.len() <= 1 {
            return Err(RostraError::InvalidInput(
                "The catalog must keep at least one combo".to_string(),
            ));
        }
        Ok(session.remove_combo(id))
    })
    .await
}

pub async fn cmd_label(
    settings: &AppSettings,
    json_mode: bool,
    id: u64,
    label: &str,
) -> Result<(), RostraError> {
    let id = ComboId(id);
    mutate(settings, json_mode, |session| {
        require_combo(session, id)?;
        Ok(session.set_label(id, label))
    })
    .await
}

pub async fn cmd_slot(
    settings: &AppSettings,
    json_mode: bool,
    id: u64,
    slot: usize,
    modifier: u16,
) -> Result<(), RostraError> {
    let id = ComboId(id);
    let modifier = ModifierId(modifier);
    mutate(settings, json_mode, |session| {
        require_combo(session, id)?;
        require_modifier(session, modifier)?;
        if slot >= rostra_core::primitives::SLOT_COUNT {
            return Err(RostraError::InvalidInput(format!(
                "Slot {} out of range",
                slot
            )));
        }
        Ok(session.set_slot(id, slot, modifier))
    })
    .await
}

pub async fn cmd_move(
    settings: &AppSettings,
    json_mode: bool,
    from: ListId,
    from_index: usize,
    to: ListId,
    to_index: Option<usize>,
) -> Result<(), RostraError> {
    let source = RosterPosition {
        list: from,
        index: from_index,
    };
    let destination = RosterPosition {
        list: to,
        index: to_index.unwrap_or(usize::MAX),
    };
    mutate(settings, json_mode, |session| {
        Ok(session.move_combo(source, Some(destination)))
    })
    .await
}

pub async fn cmd_forbid(
    settings: &AppSettings,
    json_mode: bool,
    modifier: u16,
) -> Result<(), RostraError> {
    let modifier = ModifierId(modifier);
    mutate(settings, json_mode, |session| {
        require_modifier(session, modifier)?;
        Ok(session.toggle_forbidden(modifier))
    })
    .await
}

pub async fn cmd_hotkey(
    settings: &AppSettings,
    json_mode: bool,
    hotkey: &str,
) -> Result<(), RostraError> {
    mutate(settings, json_mode, |session| Ok(session.set_hotkey(hotkey))).await
}

pub async fn cmd_tiers(
    settings: &AppSettings,
    json_mode: bool,
    show_tiers: bool,
) -> Result<(), RostraError> {
    mutate(settings, json_mode, |session| {
        Ok(session.set_show_tiers(show_tiers))
    })
    .await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write a fresh configuration built from the modifier graph.
pub fn cmd_init(settings: &AppSettings, force: bool) -> Result<(), RostraError> {
    let graph = settings.load_graph()?;
    let store = settings.open_store()?;
    if store.load()?.is_some() && !force {
        return Err(RostraError::InvalidInput(
            "Configuration already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let session = Session::load(graph, None)?;
    store.save(&sanitize_snapshot(session.config()))?;
    println!(
        "Initialized new {} configuration at {:?}",
        settings.backend, settings.config_path
    );
    Ok(())
}
