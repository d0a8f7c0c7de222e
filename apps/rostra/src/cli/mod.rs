//! # Rostra CLI Module
//!
//! This module implements the CLI interface for Rostra.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `status` - Show catalog, roster and persistence status
//! - `modifiers` - List modifiers with tiers
//! - `unused` - List unused modifiers
//! - `add` / `remove` / `label` / `slot` - Catalog edits
//! - `move` - Move a combo between or within the roster lists
//! - `forbid` - Toggle a modifier's forbidden flag
//! - `hotkey` / `tiers` - Preferences
//! - `hash` - BLAKE3 hash of the persisted snapshot
//! - `init` - Write a fresh configuration

mod commands;

use crate::settings::{AppSettings, Backend};
use clap::{Parser, Subcommand, ValueEnum};
use rostra_core::{ListId, RostraError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Rostra - combo catalog and roster manager
///
/// Curates a catalog of four-modifier combos and the prioritised roster
/// built from it.
#[derive(Parser, Debug)]
#[command(name = "rostra")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML settings file (default: ./rostra.toml if present)
    #[arg(short = 'S', long, global = true)]
    pub settings: Option<PathBuf>,

    /// Path of the persisted configuration
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path of the modifier graph (JSON array)
    #[arg(short = 'M', long, global = true)]
    pub modifiers: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Debounce window of the persistence coordinator, in milliseconds
    #[arg(long, global = true)]
    pub debounce_ms: Option<u64>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// A roster list on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListArg {
    Active,
    Inactive,
}

impl From<ListArg> for ListId {
    fn from(list: ListArg) -> Self {
        match list {
            ListArg::Active => ListId::Active,
            ListArg::Inactive => ListId::Inactive,
        }
    }
}

/// On/off switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show catalog, roster and persistence status
    Status,

    /// List modifiers with tiers
    Modifiers,

    /// List modifiers not used by any roster combo
    Unused,

    /// Add a combo built from the default template
    Add,

    /// Remove a combo from catalog and roster
    Remove {
        /// Combo id
        id: u64,
    },

    /// Rename a combo (empty label clears it)
    Label {
        /// Combo id
        id: u64,
        /// New label
        label: String,
    },

    /// Assign a modifier to one slot of a combo
    Slot {
        /// Combo id
        id: u64,
        /// Slot index (0-3)
        slot: usize,
        /// Modifier id
        modifier: u16,
    },

    /// Move a combo between or within the roster lists
    Move {
        /// Source list
        #[arg(value_enum)]
        from: ListArg,
        /// Index in the source list
        from_index: usize,
        /// Destination list
        #[arg(value_enum)]
        to: ListArg,
        /// Index in the destination list (default: end)
        to_index: Option<usize>,
    },

    /// Toggle a modifier's forbidden flag
    Forbid {
        /// Modifier id
        modifier: u16,
    },

    /// Set the hotkey string
    Hotkey {
        /// Hotkey, e.g. "alt + 1"
        hotkey: String,
    },

    /// Show or hide tiers
    Tiers {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Compute BLAKE3 hash of the persisted snapshot
    Hash,

    /// Write a fresh configuration
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Load settings and apply the global flag overrides.
    pub fn resolve_settings(&self) -> Result<AppSettings, RostraError> {
        let mut settings = AppSettings::load(self.settings.as_deref())?;
        if let Some(config) = &self.config {
            settings.config_path.clone_from(config);
        }
        if let Some(modifiers) = &self.modifiers {
            settings.modifiers_path.clone_from(modifiers);
        }
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            settings.debounce_ms = debounce_ms;
        }
        Ok(settings)
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), RostraError> {
    let mut settings = cli.resolve_settings()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            cmd_serve(&settings).await
        }
        Some(Commands::Status) | None => cmd_status(&settings, json_mode),
        Some(Commands::Modifiers) => cmd_modifiers(&settings, json_mode),
        Some(Commands::Unused) => cmd_unused(&settings, json_mode),
        Some(Commands::Add) => cmd_add(&settings, json_mode).await,
        Some(Commands::Remove { id }) => cmd_remove(&settings, json_mode, id).await,
        Some(Commands::Label { id, label }) => cmd_label(&settings, json_mode, id, &label).await,
        Some(Commands::Slot { id, slot, modifier }) => {
            cmd_slot(&settings, json_mode, id, slot, modifier).await
        }
        Some(Commands::Move {
            from,
            from_index,
            to,
            to_index,
        }) => cmd_move(&settings, json_mode, from.into(), from_index, to.into(), to_index).await,
        Some(Commands::Forbid { modifier }) => cmd_forbid(&settings, json_mode, modifier).await,
        Some(Commands::Hotkey { hotkey }) => cmd_hotkey(&settings, json_mode, &hotkey).await,
        Some(Commands::Tiers { state }) => {
            cmd_tiers(&settings, json_mode, state == Toggle::On).await
        }
        Some(Commands::Hash) => cmd_hash(&settings, json_mode),
        Some(Commands::Init { force }) => cmd_init(&settings, force),
    }
}
