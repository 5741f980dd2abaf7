//! Event bus implementation.

use tokio::sync::broadcast;

use super::types::SyncEvent;

/// Fan-out of [`SyncEvent`]s to every subscriber.
///
/// Publishing never blocks. Events are best-effort: a subscriber that lags
/// behind the buffer loses the oldest ones.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with the given buffer size
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: SyncEvent) {
        if self.tx.send(event).is_err() {
            // No subscribers - this is normal, not an error
            tracing::trace!(target: "runtime::events", "no subscribers for sync event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = EventBus::with_capacity(4);
        bus.publish(SyncEvent::RefreshFailed {
            message: "dropped".into(),
        });

        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        bus.publish(SyncEvent::RefreshFailed {
            message: "boom".into(),
        });

        for rx in [&mut first, &mut second] {
            match rx.recv().await.unwrap() {
                SyncEvent::RefreshFailed { message } => assert_eq!(message, "boom"),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }
}
