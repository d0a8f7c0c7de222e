//! # Rostra HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Session and persistence summary
//! - `GET /configuration` - The live configuration
//! - `GET /modifiers` - All modifiers with tiers
//! - `GET /roster` - Active and inactive lists
//! - `GET /unused` - Unused modifiers with locked/highlight flags
//! - `GET /hash` - BLAKE3 hash of the persisted snapshot
//! - `POST /combos` - Add a combo
//! - `DELETE /combos/{id}` - Remove a combo
//! - `PUT /combos/{id}/label` - Rename a combo
//! - `PUT /combos/{id}/slots/{slot}` - Assign a slot
//! - `POST /roster/drag`, `DELETE /roster/drag` - Begin/end a drag
//! - `POST /roster/move` - Apply a drop
//! - `POST /modifiers/{id}/forbidden` - Toggle a modifier's forbidden flag
//! - `PUT /preferences` - Hotkey and tier display
//! - `POST /flush` - Write the pending snapshot now
//!
//! ## Configuration (Environment Variables)
//!
//! - `ROSTRA_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `rostra::api::*`)
pub use handlers::{
    add_combo_handler, begin_drag_handler, configuration_handler, end_drag_handler,
    flush_handler, hash_handler, health_handler, modifiers_handler, move_handler,
    preferences_handler, remove_combo_handler, roster_handler, set_label_handler,
    set_slot_handler, status_handler, toggle_forbidden_handler, unused_handler,
};
pub use types::{
    ComboView, ConfigurationView, DragRequest, ErrorResponse, FlushResponse, HashResponse,
    HealthResponse, LabelRequest, ModifierView, MoveRequest, MutationResponse,
    PreferencesRequest, RosterView, SlotRequest, StatusResponse, UnusedModifierView,
    UnusedResponse,
};

use crate::coordinator::{ClosePolicy, PersistenceCoordinator};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use rostra_core::{RostraError, Session};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The live editing session.
    pub session: Arc<RwLock<Session>>,
    /// Debounced writer of configuration snapshots.
    pub coordinator: Arc<PersistenceCoordinator>,
    /// Catalog cap enforced by `POST /combos`.
    pub max_catalog_size: usize,
}

impl AppState {
    /// Create new app state.
    #[must_use]
    pub fn new(
        session: Session,
        coordinator: PersistenceCoordinator,
        max_catalog_size: usize,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            coordinator: Arc::new(coordinator),
            max_catalog_size,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build CORS layer from environment configuration.
///
/// Reads `ROSTRA_CORS_ORIGINS`:
/// - If "*": allows all origins
/// - If not set: localhost only
/// - Otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("ROSTRA_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (ROSTRA_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in ROSTRA_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => build_localhost_cors(),
    }
}

/// CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:1420",
        "http://localhost:3000",
        "http://127.0.0.1:1420",
        "http://127.0.0.1:3000",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/configuration", get(handlers::configuration_handler))
        .route("/modifiers", get(handlers::modifiers_handler))
        .route("/roster", get(handlers::roster_handler))
        .route("/unused", get(handlers::unused_handler))
        .route("/hash", get(handlers::hash_handler))
        .route("/combos", post(handlers::add_combo_handler))
        .route(
            "/combos/{id}",
            axum::routing::delete(handlers::remove_combo_handler),
        )
        .route("/combos/{id}/label", put(handlers::set_label_handler))
        .route("/combos/{id}/slots/{slot}", put(handlers::set_slot_handler))
        .route(
            "/roster/drag",
            post(handlers::begin_drag_handler).delete(handlers::end_drag_handler),
        )
        .route("/roster/move", post(handlers::move_handler))
        .route(
            "/modifiers/{id}/forbidden",
            post(handlers::toggle_forbidden_handler),
        )
        .route("/preferences", put(handlers::preferences_handler))
        .route("/flush", post(handlers::flush_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(axum::extract::DefaultBodyLimit::max(64 * 1024)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and flush pending edits on shutdown.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), RostraError> {
    let coordinator = Arc::clone(&state.coordinator);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RostraError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Rostra HTTP server listening on {}", addr);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RostraError::IoError(format!("Server error: {}", e)));

    finish_serving(served, &coordinator).await
}

/// Flush pending edits, then report the server result ahead of the flush
/// result. Runs whether or not the server stopped on an error.
async fn finish_serving(
    served: Result<(), RostraError>,
    coordinator: &PersistenceCoordinator,
) -> Result<(), RostraError> {
    let closed = coordinator.close(ClosePolicy::Flush).await;
    match &closed {
        Ok(outcome) => tracing::info!(?outcome, "Persistence coordinator closed"),
        Err(e) => tracing::warn!("Final flush failed: {}", e),
    }
    served?;
    closed.map(|_| ())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
