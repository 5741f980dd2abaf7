//! Line-oriented terminal frontend for the lottery client.
//!
//! # Architecture
//!
//! CliFrontend is a pure UI layer that:
//! - Receives an EngineHandle for communication
//! - Does NOT own the session runtime
//! - Renders snapshots and notices, and submits intents typed on stdin

mod app;
mod config;
mod input;
mod presentation;

pub use app::CliFrontend;
pub use config::CliConfig;
pub use input::{CliCommand, parse_command};

// Re-export for convenience (used by the binary)
pub use client_frontend_core::FrontendConfig;
