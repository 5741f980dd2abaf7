//! Pending work shared between trigger producers and the reconciliation worker.
//!
//! Producers never wait: a trigger only marks the engine dirty and folds its
//! payload into the next pass. The worker takes everything accumulated in one
//! step, so any burst between two passes costs a single build.

use std::sync::{Mutex, MutexGuard, PoisonError};

use client_blockchain_core::{TransactionId, Trigger, WinnerRecord};
use tokio::sync::{Notify, oneshot};
use tracing::debug;

use crate::api::{Result, RuntimeError};
use crate::utils::RecentSet;

/// Everything accumulated for one pass.
#[derive(Default)]
pub(crate) struct PendingWork {
    pub rebuild: bool,
    pub triggers: usize,
    pub winner: Option<WinnerRecord>,
    pub own_transactions: Vec<TransactionId>,
    pub flushes: Vec<oneshot::Sender<()>>,
}

impl PendingWork {
    fn is_idle(&self) -> bool {
        !self.rebuild && self.flushes.is_empty()
    }
}

struct QueueState {
    work: PendingWork,
    /// Transactions this client submitted and already reconciled.
    own_echoes: RecentSet<TransactionId>,
    closed: bool,
}

pub(crate) struct TriggerQueue {
    state: Mutex<QueueState>,
    wake: Notify,
}

impl TriggerQueue {
    pub fn new(echo_memory: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                work: PendingWork::default(),
                own_echoes: RecentSet::new(echo_memory),
                closed: false,
            }),
            wake: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold a trigger into the next pass.
    pub fn push(&self, trigger: Trigger) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(RuntimeError::EngineStopped);
        }

        match &trigger {
            Trigger::ManualRefresh => {}
            Trigger::EntryEvent {
                origin: Some(origin),
                participant,
            } if state.own_echoes.contains(&origin.transaction) => {
                debug!(
                    target: "runtime::engine",
                    participant = %participant,
                    tx = %origin.transaction,
                    "entry event echoes an own transaction, skipping"
                );
                return Ok(());
            }
            Trigger::EntryEvent { .. } => {}
            Trigger::WinnerEvent { record, .. } => state.work.winner = Some(*record),
            Trigger::PostTxOptimistic { receipt } => {
                state.work.own_transactions.push(receipt.transaction)
            }
        }

        state.work.rebuild = true;
        state.work.triggers += 1;
        drop(state);

        debug!(target: "runtime::engine", trigger = trigger.label(), "trigger queued");
        self.wake.notify_one();
        Ok(())
    }

    /// Register a flush; the receiver fires once the pass covering every
    /// earlier trigger has finished.
    pub fn flush(&self) -> Result<oneshot::Receiver<()>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        let mut state = self.lock();
        if state.closed {
            return Err(RuntimeError::EngineStopped);
        }
        state.work.flushes.push(reply_tx);
        drop(state);

        self.wake.notify_one();
        Ok(reply_rx)
    }

    /// Wait for pending work and take all of it. `None` once closed.
    pub async fn next_batch(&self) -> Option<PendingWork> {
        loop {
            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if !state.work.is_idle() {
                    return Some(std::mem::take(&mut state.work));
                }
            }
            self.wake.notified().await;
        }
    }

    /// Remember reconciled own transactions so their entry echoes are skipped.
    pub fn remember_own(&self, transactions: Vec<TransactionId>) {
        let mut state = self.lock();
        for transaction in transactions {
            state.own_echoes.insert(transaction);
        }
    }

    /// Refuse further work and drop every pending flush reply.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.work = PendingWork::default();
        drop(state);

        self.wake.notify_one();
    }
}
