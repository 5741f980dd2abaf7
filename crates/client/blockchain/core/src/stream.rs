//! Channel-backed lazy streams for push events and wallet notifications.

use tokio::sync::mpsc;

use crate::traits::LedgerError;
use crate::types::{EventKind, LedgerEvent, WalletEvent};

/// Producer side of an [`EventSubscription`].
pub type EventSender = mpsc::Sender<Result<LedgerEvent, LedgerError>>;

/// Infinite, non-restartable sequence of ledger events of one kind.
///
/// Dropping the subscription stops the producer the next time it sends.
pub struct EventSubscription {
    kind: EventKind,
    rx: mpsc::Receiver<Result<LedgerEvent, LedgerError>>,
}

impl EventSubscription {
    /// Create a linked producer/subscription pair.
    pub fn channel(kind: EventKind, buffer: usize) -> (EventSender, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { kind, rx })
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Next delivery. `None` only once the producer has stopped for good.
    pub async fn next(&mut self) -> Option<Result<LedgerEvent, LedgerError>> {
        self.rx.recv().await
    }
}

/// Stream of wallet notifications.
pub struct WalletWatch {
    rx: mpsc::Receiver<WalletEvent>,
}

impl WalletWatch {
    pub fn channel(buffer: usize) -> (mpsc::Sender<WalletEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx })
    }

    pub async fn next(&mut self) -> Option<WalletEvent> {
        self.rx.recv().await
    }
}
