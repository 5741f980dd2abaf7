//! Session runtime orchestrator.
//!
//! The runtime owns the background tasks of one connected session (the
//! reconciliation worker and the event bridge), wires up the trigger queue and
//! the snapshot and event channels, and exposes an [`EngineHandle`] to drive them.

use std::env;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use client_blockchain_core::{Wei, entry_fee};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{EngineHandle, Result};
use crate::events::EventBus;
use crate::session::Session;
use crate::sync::{RosterScanner, SnapshotBuilder};
use crate::workers::{EventBridge, ReconciliationWorker, TriggerQueue};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    /// Extra attempts for a roster slot read that failed in transport
    pub scan_retries: u32,
    /// Own transactions remembered for self-echo suppression
    pub echo_memory: usize,
    /// Event origins remembered for duplicate delivery suppression
    pub seen_events: usize,
    pub entry_fee: Wei,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            scan_retries: 1,
            echo_memory: 32,
            seen_events: 256,
            entry_fee: entry_fee(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `LOTTERY_EVENT_BUFFER`
    /// - `LOTTERY_SCAN_RETRIES`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("LOTTERY_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(retries) = read_env::<u32>("LOTTERY_SCAN_RETRIES") {
            config.scan_retries = retries;
        }

        config
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}

/// Background tasks of one connected session.
///
/// Dropping the runtime (or calling [`SessionRuntime::reset`]) aborts every
/// task; handles still held elsewhere then report [`crate::RuntimeError::EngineStopped`].
pub struct SessionRuntime {
    handle: EngineHandle,
    engine_task: JoinHandle<()>,
    bridge_tasks: Vec<JoinHandle<()>>,
}

impl SessionRuntime {
    /// Spawn the engine and the event bridge, then queue the initial refresh.
    pub async fn start(session: &Session, config: &RuntimeConfig) -> Result<Self> {
        let ledger = session.ledger();
        let queue = Arc::new(TriggerQueue::new(config.echo_memory));
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let builds = Arc::new(AtomicU64::new(0));

        let builder = SnapshotBuilder::new(
            Arc::clone(&ledger),
            RosterScanner::new(config.scan_retries),
        );
        let worker = ReconciliationWorker::new(
            session.account(),
            builder,
            Arc::clone(&queue),
            snapshot_tx,
            event_bus.clone(),
            Arc::clone(&builds),
        );
        let engine_task = tokio::spawn(worker.run());

        let bridge_tasks = EventBridge::new(
            Arc::clone(&ledger),
            Arc::clone(&queue),
            event_bus.clone(),
            config.seen_events,
        )
        .start()
        .await;

        let handle = EngineHandle::new(
            queue,
            snapshot_rx,
            event_bus,
            builds,
            ledger,
            session.account(),
            config.entry_fee,
        );
        handle.refresh()?;

        tracing::info!(
            target: "runtime::session",
            account = %session.account(),
            subscriptions = bridge_tasks.len(),
            "session runtime started"
        );

        Ok(Self {
            handle,
            engine_task,
            bridge_tasks,
        })
    }

    /// Get a cloneable handle to this session's engine
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Tear the session down.
    pub fn reset(self) {
        tracing::info!(target: "runtime::session", "session runtime reset");
        drop(self);
    }

    fn abort_tasks(&self) {
        for task in &self.bridge_tasks {
            task.abort();
        }
        self.engine_task.abort();
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
