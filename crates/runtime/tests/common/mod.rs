#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{Address, MockLedger};
use runtime::{EngineHandle, RuntimeConfig, Session, SessionRuntime, SyncEvent};
use tokio::sync::broadcast;

pub const MANAGER: Address = Address([0xaa; 20]);

pub fn addr(byte: u8) -> Address {
    Address([byte; 20])
}

/// Start a session runtime over `ledger` and wait for the initial build.
pub async fn start(ledger: &MockLedger, account: Address) -> (SessionRuntime, EngineHandle) {
    let session = Session::new(account, 1337, Arc::new(ledger.clone()));
    let runtime = SessionRuntime::start(&session, &RuntimeConfig::default())
        .await
        .expect("session runtime should start");
    let handle = runtime.handle();
    handle.flush().await.expect("initial flush");
    (runtime, handle)
}

/// Receive sync events until one matches.
pub async fn next_matching(
    rx: &mut broadcast::Receiver<SyncEvent>,
    predicate: impl Fn(&SyncEvent) -> bool,
) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) => continue,
                Err(error) => panic!("sync event stream failed: {error}"),
            }
        }
    })
    .await
    .expect("timed out waiting for sync event")
}

/// Poll `condition` until it holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition never became true");
}
