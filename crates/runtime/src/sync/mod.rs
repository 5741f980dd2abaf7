//! Ledger reads that produce snapshots.

mod builder;
mod scanner;

pub use builder::SnapshotBuilder;
pub use scanner::RosterScanner;
