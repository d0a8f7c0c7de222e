//! # Rostra
//!
//! The main binary for the Rostra combo catalog and roster manager.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) for the rendering layer
//! - CLI interface for catalog and roster edits
//! - Debounced persistence of the configuration
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/rostra (THE BINARY)                 │
//! │                                                          │
//! │   ┌─────────────┐   ┌─────────────┐                      │
//! │   │    CLI      │   │  HTTP API   │                      │
//! │   │   (clap)    │   │   (axum)    │                      │
//! │   └──────┬──────┘   └──────┬──────┘                      │
//! │          └────────┬────────┘                             │
//! │                   ▼                                      │
//! │   ┌───────────────────────────┐   ┌──────────────────┐   │
//! │   │       rostra-core         │──▶│   Persistence    │   │
//! │   │       (THE LOGIC)         │   │   Coordinator    │   │
//! │   └───────────────────────────┘   └──────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! rostra serve --host 127.0.0.1 --port 8080
//!
//! # CLI operations
//! rostra status
//! rostra add
//! rostra move active 1 inactive 0
//! ```

use clap::Parser;
use rostra::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing (ROSTRA_LOG_FORMAT=json for machine-parseable output)
    let log_format = std::env::var("ROSTRA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rostra=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode && matches!(cli.command, Some(cli::Commands::Serve { .. })) {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Rostra startup banner.
fn print_banner() {
    println!(
        r#"
  ____           _
 |  _ \ ___  ___| |_ _ __ __ _
 | |_) / _ \/ __| __| '__/ _` |
 |  _ < (_) \__ \ |_| | | (_| |
 |_| \_\___/|___/\__|_|  \__,_|

  Combo Roster v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
