//! Reconciliation worker that owns the published [`LotterySnapshot`].
//!
//! Takes the triggers that [`crate::EngineHandle`] and the event bridge
//! accumulated in the shared queue as a single pass, and publishes the result
//! over a `watch` channel. Only this task ever writes the snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use client_blockchain_core::{Address, LotterySnapshot, TransactionId, WinnerRecord};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::queue::{PendingWork, TriggerQueue};
use crate::events::{EventBus, SnapshotChanges, SyncEvent};
use crate::sync::SnapshotBuilder;

pub(crate) type SnapshotSender = watch::Sender<Option<Arc<LotterySnapshot>>>;

/// Background task that serializes every snapshot write.
pub(crate) struct ReconciliationWorker {
    account: Address,
    builder: SnapshotBuilder,
    queue: Arc<TriggerQueue>,
    snapshot_tx: SnapshotSender,
    events: EventBus,
    builds: Arc<AtomicU64>,
    /// Winner observed during a pass whose build failed.
    pending_winner: Option<WinnerRecord>,
}

impl ReconciliationWorker {
    pub fn new(
        account: Address,
        builder: SnapshotBuilder,
        queue: Arc<TriggerQueue>,
        snapshot_tx: SnapshotSender,
        events: EventBus,
        builds: Arc<AtomicU64>,
    ) -> Self {
        Self {
            account,
            builder,
            queue,
            snapshot_tx,
            events,
            builds,
            pending_winner: None,
        }
    }

    /// Main worker loop.
    ///
    /// Takes everything queued since the previous pass at once, so a burst of
    /// triggers costs a single build.
    pub async fn run(mut self) {
        while let Some(work) = self.queue.next_batch().await {
            self.reconcile(work).await;
        }

        debug!(target: "runtime::engine", "trigger queue closed, engine stopped");
    }

    async fn reconcile(&mut self, work: PendingWork) {
        if let Some(record) = work.winner {
            self.pending_winner = Some(record);
        }

        if work.rebuild {
            self.rebuild(work.triggers, work.own_transactions).await;
        }

        for reply in work.flushes {
            let _ = reply.send(());
        }
    }

    async fn rebuild(&mut self, triggers: usize, own_transactions: Vec<TransactionId>) {
        let result = self.builder.build(self.account).await;
        self.builds.fetch_add(1, Ordering::Release);

        let fresh = match result {
            Ok(snapshot) => snapshot,
            Err(error) => {
                let message = refresh_failure_message(&error);
                warn!(
                    target: "runtime::engine",
                    triggers,
                    error = %message,
                    "refresh failed, keeping previous snapshot"
                );
                self.events.publish(SyncEvent::RefreshFailed { message });
                return;
            }
        };

        let previous = self.snapshot_tx.borrow().clone();
        let winner = self
            .pending_winner
            .take()
            .or_else(|| previous.as_ref().and_then(|s| s.winner().copied()));
        let snapshot = fresh.with_winner(winner);
        let changes = SnapshotChanges::between(previous.as_deref(), &snapshot);

        info!(
            target: "runtime::engine",
            triggers,
            participants = snapshot.participant_count(),
            pool = %snapshot.prize_pool(),
            role = %snapshot.role(),
            "snapshot reconciled"
        );

        self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
        self.queue.remember_own(own_transactions);

        if !changes.is_empty() {
            self.events
                .publish(SyncEvent::SnapshotUpdated { changes, triggers });
        }
    }
}

impl Drop for ReconciliationWorker {
    fn drop(&mut self) {
        self.queue.close();
    }
}

fn refresh_failure_message(error: &crate::RuntimeError) -> String {
    match std::error::Error::source(error) {
        Some(source) => format!("{error}: {source}"),
        None => error.to_string(),
    }
}
