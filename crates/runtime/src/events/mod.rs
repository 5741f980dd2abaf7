//! Broadcast bus for synchronization events.
//!
//! Snapshots themselves travel over a `watch` channel; this bus carries the
//! notifications a frontend turns into notices (refresh failures, observed
//! contract events, closed subscriptions).

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{SnapshotChanges, SyncEvent};
