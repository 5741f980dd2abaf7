//! Cloneable façade for the reconciliation engine.
//!
//! [`EngineHandle`] hides the trigger queue and the snapshot channel, and
//! offers helpers for triggering reconciliation, reading the published
//! snapshot, and submitting the user's intents.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use client_blockchain_core::{Address, LotteryLedger, LotterySnapshot, Trigger, TxReceipt, Wei};
use tokio::sync::{broadcast, watch};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, SyncEvent};
use crate::workers::TriggerQueue;

/// Client-facing handle to interact with a running session
#[derive(Clone)]
pub struct EngineHandle {
    queue: Arc<TriggerQueue>,
    snapshot_rx: watch::Receiver<Option<Arc<LotterySnapshot>>>,
    event_bus: EventBus,
    builds: Arc<AtomicU64>,
    ledger: Arc<dyn LotteryLedger>,
    account: Address,
    entry_fee: Wei,
}

impl EngineHandle {
    pub(crate) fn new(
        queue: Arc<TriggerQueue>,
        snapshot_rx: watch::Receiver<Option<Arc<LotterySnapshot>>>,
        event_bus: EventBus,
        builds: Arc<AtomicU64>,
        ledger: Arc<dyn LotteryLedger>,
        account: Address,
        entry_fee: Wei,
    ) -> Self {
        Self {
            queue,
            snapshot_rx,
            event_bus,
            builds,
            ledger,
            account,
            entry_fee,
        }
    }

    /// Queue a reconciliation trigger.
    ///
    /// Never waits: triggers queued while a pass is running are merged into
    /// the next one.
    pub fn trigger(&self, trigger: Trigger) -> Result<()> {
        self.queue.push(trigger)
    }

    pub fn refresh(&self) -> Result<()> {
        self.trigger(Trigger::ManualRefresh)
    }

    /// Wait until every trigger queued before this call has been reconciled.
    pub async fn flush(&self) -> Result<()> {
        let reply_rx = self.queue.flush()?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Latest published snapshot, `None` until the first build succeeds.
    pub fn snapshot(&self) -> Option<Arc<LotterySnapshot>> {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified on every published snapshot.
    pub fn watch(&self) -> watch::Receiver<Option<Arc<LotterySnapshot>>> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_bus.subscribe()
    }

    /// Number of build passes the engine has finished, failed ones included.
    pub fn builds_completed(&self) -> u64 {
        self.builds.load(Ordering::Acquire)
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// Pay the entry fee from the session account.
    ///
    /// On acceptance the engine is told to reconcile, and the matching
    /// `participantsEntered` echo is later recognized as redundant.
    pub async fn enter(&self) -> Result<TxReceipt> {
        let receipt = self
            .ledger
            .submit_entry(self.account, self.entry_fee)
            .await
            .map_err(RuntimeError::from_submission)?;

        tracing::info!(target: "runtime::engine", tx = %receipt.transaction, "entry accepted");
        self.trigger(Trigger::PostTxOptimistic { receipt })?;
        Ok(receipt)
    }

    /// Ask the contract to pick a winner. Only the manager may do this.
    pub async fn select_winner(&self) -> Result<TxReceipt> {
        let receipt = self
            .ledger
            .submit_select_winner(self.account)
            .await
            .map_err(RuntimeError::from_submission)?;

        tracing::info!(
            target: "runtime::engine",
            tx = %receipt.transaction,
            "winner selection accepted"
        );
        self.trigger(Trigger::PostTxOptimistic { receipt })?;
        Ok(receipt)
    }
}
