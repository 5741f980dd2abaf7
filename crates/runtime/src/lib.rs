//! Lottery state synchronization and reconciliation.
//!
//! This crate turns the three ways the client learns about the ledger (manual
//! reads, contract events, and its own accepted transactions) into a single
//! stream of consistent [`LotterySnapshot`]s. Consumers start a
//! [`SessionRuntime`] for a connected [`Session`] and interact with it through
//! [`EngineHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the session runtime and its configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the broadcast bus for [`SyncEvent`]s
//! - [`sync`] reads the ledger into snapshots
//! - [`workers`] keeps background tasks internal to the crate
//!
//! [`LotterySnapshot`]: client_blockchain_core::LotterySnapshot
pub mod api;
pub mod events;
pub mod runtime;
pub mod session;
pub mod sync;

mod utils;
mod workers;

pub use api::{EngineHandle, Result, RuntimeError};
pub use events::{EventBus, SnapshotChanges, SyncEvent};
pub use runtime::{RuntimeConfig, SessionRuntime};
pub use session::Session;
pub use sync::{RosterScanner, SnapshotBuilder};
