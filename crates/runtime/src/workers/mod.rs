//! Worker tasks that back the session runtime.
//!
//! The reconciliation worker owns the published snapshot, while the event
//! bridge turns contract events into triggers for it.

mod bridge;
mod engine;
mod queue;

pub(crate) use bridge::EventBridge;
pub(crate) use engine::ReconciliationWorker;
pub(crate) use queue::TriggerQueue;
