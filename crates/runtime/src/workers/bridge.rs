//! Contract event subscriptions feeding the reconciliation worker.

use std::sync::Arc;

use client_blockchain_core::{
    BlockTag, EventKind, EventOrigin, EventSubscription, LedgerEvent, LotteryLedger, Trigger,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::queue::TriggerQueue;
use crate::events::{EventBus, SyncEvent};
use crate::utils::RecentSet;

const SUBSCRIBED_KINDS: [EventKind; 2] = [EventKind::ParticipantEntered, EventKind::WinnerSelected];

/// Forwards every distinct contract event to the engine as a [`Trigger`].
///
/// Deliveries are at-least-once; a shared set of recently seen origins drops
/// repeats across both subscriptions.
#[derive(Clone)]
pub(crate) struct EventBridge {
    ledger: Arc<dyn LotteryLedger>,
    queue: Arc<TriggerQueue>,
    events: EventBus,
    seen: Arc<Mutex<RecentSet<EventOrigin>>>,
}

impl EventBridge {
    pub fn new(
        ledger: Arc<dyn LotteryLedger>,
        queue: Arc<TriggerQueue>,
        events: EventBus,
        seen_capacity: usize,
    ) -> Self {
        Self {
            ledger,
            queue,
            events,
            seen: Arc::new(Mutex::new(RecentSet::new(seen_capacity))),
        }
    }

    /// Subscribe to both event kinds and spawn one forwarding task each.
    ///
    /// Subscriptions are live when this returns. A kind that cannot be
    /// subscribed is reported as closed; manual refresh still works.
    pub async fn start(self) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::with_capacity(SUBSCRIBED_KINDS.len());

        for kind in SUBSCRIBED_KINDS {
            match self.ledger.subscribe(kind, BlockTag::Latest).await {
                Ok(subscription) => {
                    info!(target: "runtime::bridge", %kind, "subscribed to contract events");
                    tasks.push(tokio::spawn(self.clone().forward(subscription)));
                }
                Err(error) => {
                    warn!(target: "runtime::bridge", %kind, %error, "event subscription failed");
                    self.events.publish(SyncEvent::SubscriptionClosed { kind });
                }
            }
        }

        tasks
    }

    async fn forward(self, mut subscription: EventSubscription) {
        let kind = subscription.kind();

        while let Some(delivery) = subscription.next().await {
            let event = match delivery {
                Ok(event) => event,
                Err(error) => {
                    warn!(target: "runtime::bridge", %kind, %error, "event subscription error");
                    continue;
                }
            };

            if !self.seen.lock().await.insert(*event.origin()) {
                debug!(
                    target: "runtime::bridge",
                    %kind,
                    tx = %event.origin().transaction,
                    log_index = event.origin().log_index,
                    "duplicate event delivery dropped"
                );
                continue;
            }

            self.events.publish(match &event {
                LedgerEvent::ParticipantEntered { participant, .. } => {
                    SyncEvent::ParticipantEntered {
                        participant: *participant,
                    }
                }
                LedgerEvent::WinnerSelected { record, .. } => {
                    SyncEvent::WinnerSelected { record: *record }
                }
            });

            if self.queue.push(Trigger::from(event)).is_err() {
                debug!(target: "runtime::bridge", %kind, "engine stopped, bridge exiting");
                return;
            }
        }

        warn!(
            target: "runtime::bridge",
            %kind,
            "event subscription ended and will not be reopened; use manual refresh"
        );
        self.events.publish(SyncEvent::SubscriptionClosed { kind });
    }
}
