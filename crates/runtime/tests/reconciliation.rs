//! Reconciliation engine behavior against the in-memory ledger.

mod common;

use std::sync::Arc;

use client_blockchain_core::{
    EventKind, LedgerError, LedgerEvent, LotteryRole, MIN_PARTICIPANTS_FOR_DRAW, MockLedger,
    Trigger, WinnerRecord, ether,
};
use runtime::{RuntimeConfig, RuntimeError, Session, SessionRuntime, SnapshotChanges, SyncEvent};

use common::{MANAGER, addr, next_matching, start, wait_until};

fn winner(byte: u8, amount: u64) -> WinnerRecord {
    WinnerRecord {
        address: addr(byte),
        amount: ether(amount),
    }
}

#[tokio::test]
async fn nothing_is_published_before_the_first_build() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1)]);
    let gate = ledger.hold_reads().await;

    let session = Session::new(addr(1), 1, Arc::new(ledger.clone()));
    let runtime = SessionRuntime::start(&session, &RuntimeConfig::default())
        .await
        .unwrap();
    let handle = runtime.handle();

    wait_until(|| ledger.counters().balance_reads == 1).await;
    assert!(handle.snapshot().is_none());

    drop(gate);
    handle.flush().await.unwrap();

    let snapshot = handle.snapshot().expect("snapshot after first build");
    assert_eq!(snapshot.role(), LotteryRole::Participant);
    assert_eq!(snapshot.roster().as_slice(), &[addr(1)]);
}

#[tokio::test]
async fn winner_event_applied_twice_is_idempotent() {
    let ledger = MockLedger::new(MANAGER)
        .with_participants(&[addr(1), addr(2), addr(3)])
        .with_balance(ether(3));
    let (_runtime, handle) = start(&ledger, addr(1)).await;

    let record = winner(2, 3);
    let event = Trigger::WinnerEvent {
        record,
        origin: None,
    };

    handle.trigger(event.clone()).unwrap();
    handle.flush().await.unwrap();
    let first = handle.snapshot().unwrap();

    handle.trigger(event).unwrap();
    handle.flush().await.unwrap();
    let second = handle.snapshot().unwrap();

    assert_eq!(first.winner(), Some(&record));
    assert_eq!(*first, *second);
}

#[tokio::test]
async fn manual_refresh_keeps_recorded_winner() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1)]);
    let (_runtime, handle) = start(&ledger, addr(1)).await;

    let record = winner(7, 5);
    handle
        .trigger(Trigger::WinnerEvent {
            record,
            origin: None,
        })
        .unwrap();
    handle.flush().await.unwrap();

    ledger.set_balance(ether(1));
    ledger.push_participant(addr(2));
    handle.refresh().unwrap();
    handle.flush().await.unwrap();

    let snapshot = handle.snapshot().unwrap();
    assert_eq!(snapshot.winner(), Some(&record));
    assert_eq!(snapshot.participant_count(), 2);
    assert_eq!(snapshot.prize_pool(), ether(1));
}

#[tokio::test]
async fn failed_balance_read_keeps_previous_snapshot() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1)]);
    let (_runtime, handle) = start(&ledger, addr(1)).await;
    let mut events = handle.subscribe();
    let before = handle.snapshot().unwrap();

    ledger.push_participant(addr(2));
    ledger.fail_balance_reads(Some(LedgerError::transport("node unreachable")));
    handle.refresh().unwrap();
    handle.flush().await.unwrap();

    let after = handle.snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.participant_count(), 1);

    match next_matching(&mut events, |e| matches!(e, SyncEvent::RefreshFailed { .. })).await {
        SyncEvent::RefreshFailed { message } => assert!(message.contains("node unreachable")),
        other => panic!("unexpected event {other:?}"),
    }

    // No automatic retry.
    assert_eq!(handle.builds_completed(), 2);
}

#[tokio::test]
async fn winner_seen_during_failed_pass_lands_on_next_success() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1)]);
    let (_runtime, handle) = start(&ledger, addr(1)).await;

    ledger.fail_manager_reads(Some(LedgerError::transport("timeout")));
    let record = winner(1, 4);
    handle
        .trigger(Trigger::WinnerEvent {
            record,
            origin: None,
        })
        .unwrap();
    handle.flush().await.unwrap();
    assert!(handle.snapshot().unwrap().winner().is_none());

    ledger.fail_manager_reads(None);
    handle.refresh().unwrap();
    handle.flush().await.unwrap();

    assert_eq!(handle.snapshot().unwrap().winner(), Some(&record));
}

#[tokio::test]
async fn triggers_during_a_build_coalesce_into_one_follow_up() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1)]);
    let (_runtime, handle) = start(&ledger, addr(1)).await;
    assert_eq!(handle.builds_completed(), 1);

    let gate = ledger.hold_reads().await;
    handle.refresh().unwrap();
    wait_until(|| ledger.counters().balance_reads == 2).await;

    for byte in 2..8 {
        ledger.push_participant(addr(byte));
        handle
            .trigger(Trigger::EntryEvent {
                participant: addr(byte),
                origin: None,
            })
            .unwrap();
    }
    handle.refresh().unwrap();

    drop(gate);
    handle.flush().await.unwrap();

    assert_eq!(handle.builds_completed(), 3);
    assert_eq!(ledger.counters().manager_reads, 3);
    assert_eq!(handle.snapshot().unwrap().participant_count(), 7);
}

#[tokio::test]
async fn refresh_burst_never_blocks_and_costs_one_follow_up() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1)]);
    let (_runtime, handle) = start(&ledger, addr(1)).await;

    let gate = ledger.hold_reads().await;
    handle.refresh().unwrap();
    wait_until(|| ledger.counters().balance_reads == 2).await;

    // Every caller returns while the build is still stuck on the ledger.
    let callers: Vec<_> = (0..100)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.refresh() })
        })
        .collect();
    for caller in callers {
        caller.await.unwrap().unwrap();
    }
    assert_eq!(handle.builds_completed(), 1);

    drop(gate);
    handle.flush().await.unwrap();

    assert_eq!(handle.builds_completed(), 3);
    assert_eq!(ledger.counters().balance_reads, 3);
}

#[tokio::test]
async fn manager_account_reads_manager_role() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1), addr(2)]);
    let (_runtime, handle) = start(&ledger, MANAGER).await;

    let snapshot = handle.snapshot().unwrap();
    assert_eq!(snapshot.role(), LotteryRole::Manager);
    assert!(snapshot.role().is_manager());
}

#[tokio::test]
async fn own_entry_is_reconciled_once() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1)]);
    let (_runtime, handle) = start(&ledger, addr(2)).await;
    let mut events = handle.subscribe();

    let receipt = handle.enter().await.unwrap();
    handle.flush().await.unwrap();
    assert_eq!(handle.builds_completed(), 2);
    assert!(handle.snapshot().unwrap().roster().contains(&addr(2)));

    // The contract's echo of our own entry must not cost another build.
    let echo_origin = ledger.origin(receipt.transaction.as_bytes()[0], 0);
    assert_eq!(echo_origin.transaction, receipt.transaction);
    ledger
        .emit(LedgerEvent::ParticipantEntered {
            participant: addr(2),
            origin: echo_origin,
        })
        .await;
    next_matching(&mut events, |e| {
        matches!(e, SyncEvent::ParticipantEntered { participant } if *participant == addr(2))
    })
    .await;
    handle.flush().await.unwrap();
    assert_eq!(handle.builds_completed(), 2);

    // Someone else's entry still does.
    ledger.push_participant(addr(3));
    ledger
        .emit(LedgerEvent::ParticipantEntered {
            participant: addr(3),
            origin: ledger.origin(0x77, 0),
        })
        .await;
    next_matching(&mut events, |e| {
        matches!(e, SyncEvent::ParticipantEntered { participant } if *participant == addr(3))
    })
    .await;
    handle.flush().await.unwrap();
    assert_eq!(handle.builds_completed(), 3);
    assert_eq!(handle.snapshot().unwrap().participant_count(), 3);
}

#[tokio::test]
async fn third_entry_reaches_draw_threshold() {
    let ledger = MockLedger::new(MANAGER).with_participants(&[addr(1), addr(2)]);
    let (_runtime, handle) = start(&ledger, MANAGER).await;
    let mut events = handle.subscribe();
    assert!(handle.snapshot().unwrap().participant_count() < MIN_PARTICIPANTS_FOR_DRAW);

    ledger.push_participant(addr(3));
    ledger
        .emit(LedgerEvent::ParticipantEntered {
            participant: addr(3),
            origin: ledger.origin(0x33, 0),
        })
        .await;

    match next_matching(&mut events, |e| matches!(e, SyncEvent::SnapshotUpdated { .. })).await {
        SyncEvent::SnapshotUpdated { changes, .. } => {
            assert!(changes.contains(SnapshotChanges::ROSTER))
        }
        other => panic!("unexpected event {other:?}"),
    }

    let snapshot = handle.snapshot().unwrap();
    assert_eq!(snapshot.roster().as_slice(), &[addr(1), addr(2), addr(3)]);
    assert_eq!(snapshot.participant_count(), MIN_PARTICIPANTS_FOR_DRAW);
}

#[tokio::test]
async fn rejected_entry_surfaces_raw_reason() {
    let ledger = MockLedger::new(MANAGER);
    let (_runtime, handle) = start(&ledger, MANAGER).await;
    ledger.reject_entries(Some("execution reverted: Manager cant Participate"));

    let error = handle.enter().await.unwrap_err();

    assert!(matches!(error, RuntimeError::Rejected(_)));
    assert!(
        error
            .rejection_reason()
            .is_some_and(|reason| reason.contains("Manager cant Participate"))
    );
    handle.flush().await.unwrap();
    assert_eq!(handle.builds_completed(), 1);
}

#[tokio::test]
async fn unconfirmed_entry_is_not_reported_as_a_rejection() {
    let ledger = MockLedger::new(MANAGER);
    let (_runtime, handle) = start(&ledger, addr(1)).await;
    ledger.fail_entries(Some(LedgerError::transport("receipt wait timed out")));

    let error = handle.enter().await.unwrap_err();

    assert!(matches!(error, RuntimeError::Submission(_)));
    assert!(error.rejection_reason().is_none());
    handle.flush().await.unwrap();
    assert_eq!(handle.builds_completed(), 1);
}

#[tokio::test]
async fn reset_stops_the_engine() {
    let ledger = MockLedger::new(MANAGER);
    let (runtime, handle) = start(&ledger, addr(1)).await;

    assert_eq!(ledger.subscriber_count(EventKind::WinnerSelected), 1);
    runtime.reset();

    wait_until(|| ledger.subscriber_count(EventKind::WinnerSelected) == 0).await;
    wait_until(|| handle.refresh().is_err()).await;
    assert!(matches!(handle.refresh(), Err(RuntimeError::EngineStopped)));
    assert!(handle.flush().await.is_err());
}
