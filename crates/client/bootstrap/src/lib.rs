//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, ledger and wallet assembly, and session
//! startup that can be reused by the CLI or any other front-end crate.
pub mod builder;
pub mod config;

pub use builder::{SessionBuilder, SessionSetup};
pub use config::ClientConfig;
