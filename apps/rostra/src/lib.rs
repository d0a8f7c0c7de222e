//! # rostra
//!
//! The Rostra binary crate: persistence coordinator, HTTP API, CLI and
//! settings around the pure `rostra-core` engine.

pub mod api;
pub mod cli;
pub mod coordinator;
pub mod settings;
