//! Mock ledger and wallet for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock, mpsc};

use crate::stream::{EventSender, EventSubscription, WalletWatch};
use crate::traits::{LedgerError, LotteryLedger, WalletProvider};
use crate::types::{
    Address, BlockTag, EventKind, EventOrigin, LedgerEvent, TransactionId, TxReceipt, WalletEvent,
    Wei,
};

/// Per-operation call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCounters {
    pub manager_reads: usize,
    pub balance_reads: usize,
    pub slot_reads: usize,
    pub entries: usize,
    pub selections: usize,
}

struct MockState {
    manager: Address,
    balance: Wei,
    slots: Vec<Address>,
    zero_sentinel: bool,
    manager_failure: Option<LedgerError>,
    balance_failure: Option<LedgerError>,
    slot_failures: HashMap<u64, VecDeque<LedgerError>>,
    entry_failure: Option<LedgerError>,
    selection_rejection: Option<String>,
    counters: MockCounters,
    block_number: u64,
    next_tx: u8,
}

/// In-memory lottery contract.
///
/// Entries append to the roster and grow the pool. Selecting a winner pays the
/// whole pool to slot 0 and clears the roster. Push events are only delivered
/// when a test calls [`MockLedger::emit`].
#[derive(Clone)]
pub struct MockLedger {
    state: Arc<Mutex<MockState>>,
    subscribers: Arc<Mutex<Vec<(EventKind, EventSender)>>>,
    read_gate: Arc<RwLock<()>>,
}

impl MockLedger {
    pub fn new(manager: Address) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                manager,
                balance: Wei::zero(),
                slots: Vec::new(),
                zero_sentinel: false,
                manager_failure: None,
                balance_failure: None,
                slot_failures: HashMap::new(),
                entry_failure: None,
                selection_rejection: None,
                counters: MockCounters::default(),
                block_number: 1,
                next_tx: 0,
            })),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            read_gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn with_participants(self, participants: &[Address]) -> Self {
        self.state.lock().unwrap().slots = participants.to_vec();
        self
    }

    pub fn with_balance(self, balance: Wei) -> Self {
        self.state.lock().unwrap().balance = balance;
        self
    }

    /// Report the end of the roster as a zero slot instead of a revert.
    pub fn with_zero_sentinel(self) -> Self {
        self.state.lock().unwrap().zero_sentinel = true;
        self
    }

    pub fn set_balance(&self, balance: Wei) {
        self.state.lock().unwrap().balance = balance;
    }

    pub fn push_participant(&self, participant: Address) {
        self.state.lock().unwrap().slots.push(participant);
    }

    pub fn fail_manager_reads(&self, error: Option<LedgerError>) {
        self.state.lock().unwrap().manager_failure = error;
    }

    pub fn fail_balance_reads(&self, error: Option<LedgerError>) {
        self.state.lock().unwrap().balance_failure = error;
    }

    /// Fail the next read of `index` once with `error`.
    pub fn fail_slot_once(&self, index: u64, error: LedgerError) {
        self.state
            .lock()
            .unwrap()
            .slot_failures
            .entry(index)
            .or_default()
            .push_back(error);
    }

    pub fn reject_entries(&self, reason: Option<&str>) {
        self.fail_entries(reason.map(LedgerError::rejected));
    }

    /// Fail entries with an arbitrary error, e.g. a receipt timeout.
    pub fn fail_entries(&self, error: Option<LedgerError>) {
        self.state.lock().unwrap().entry_failure = error;
    }

    pub fn reject_selection(&self, reason: Option<&str>) {
        self.state.lock().unwrap().selection_rejection = reason.map(str::to_string);
    }

    pub fn counters(&self) -> MockCounters {
        self.state.lock().unwrap().counters
    }

    /// Block balance reads until the returned guard is dropped.
    ///
    /// The counter is bumped before a read waits, so a test can observe that a
    /// build is in flight while it is held.
    pub async fn hold_reads(&self) -> OwnedRwLockWriteGuard<()> {
        self.read_gate.clone().write_owned().await
    }

    /// Deliver `event` to every live subscription of the matching kind.
    pub async fn emit(&self, event: LedgerEvent) {
        self.send_to(event.kind(), Ok(event)).await;
    }

    /// Deliver a subscription-level error.
    pub async fn emit_error(&self, kind: EventKind, error: LedgerError) {
        self.send_to(kind, Err(error)).await;
    }

    /// End every subscription of `kind`.
    pub fn close_subscriptions(&self, kind: EventKind) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(subscribed, _)| *subscribed != kind);
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|(subscribed, tx)| *subscribed == kind && !tx.is_closed())
            .count()
    }

    /// Origin for a synthetic event in the current block.
    pub fn origin(&self, tx: u8, log_index: u64) -> EventOrigin {
        EventOrigin {
            transaction: TransactionId([tx; 32]),
            log_index,
            block_number: self.state.lock().unwrap().block_number,
        }
    }

    async fn send_to(&self, kind: EventKind, item: Result<LedgerEvent, LedgerError>) {
        let senders: Vec<EventSender> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|(subscribed, _)| *subscribed == kind)
            .map(|(_, tx)| tx.clone())
            .collect();

        for tx in senders {
            let _ = tx.send(item.clone()).await;
        }
    }

    fn next_receipt(state: &mut MockState) -> TxReceipt {
        state.next_tx = state.next_tx.wrapping_add(1);
        state.block_number += 1;
        TxReceipt {
            transaction: TransactionId([state.next_tx; 32]),
            block_number: state.block_number,
        }
    }
}

#[async_trait]
impl LotteryLedger for MockLedger {
    async fn read_manager(&self) -> Result<Address, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.counters.manager_reads += 1;
        match &state.manager_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.manager),
        }
    }

    async fn read_balance(&self) -> Result<Wei, LedgerError> {
        self.state.lock().unwrap().counters.balance_reads += 1;

        let _gate = self.read_gate.read().await;

        let state = self.state.lock().unwrap();
        match &state.balance_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.balance),
        }
    }

    async fn read_roster_slot(&self, index: u64) -> Result<Address, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.counters.slot_reads += 1;

        if let Some(error) = state
            .slot_failures
            .get_mut(&index)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        match state.slots.get(index as usize) {
            Some(address) => Ok(*address),
            None if state.zero_sentinel => Ok(Address::ZERO),
            None => Err(LedgerError::slot_unavailable(index)),
        }
    }

    async fn submit_entry(&self, account: Address, fee: Wei) -> Result<TxReceipt, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.counters.entries += 1;

        if let Some(error) = &state.entry_failure {
            return Err(error.clone());
        }

        state.slots.push(account);
        state.balance += fee;
        Ok(Self::next_receipt(&mut state))
    }

    async fn submit_select_winner(&self, account: Address) -> Result<TxReceipt, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.counters.selections += 1;

        if let Some(reason) = &state.selection_rejection {
            return Err(LedgerError::rejected(reason.clone()));
        }
        if account != state.manager {
            return Err(LedgerError::rejected("execution reverted: Not Authorized"));
        }
        if state.slots.len() < crate::MIN_PARTICIPANTS_FOR_DRAW {
            return Err(LedgerError::rejected("execution reverted: require failed"));
        }

        state.slots.clear();
        state.balance = Wei::zero();
        Ok(Self::next_receipt(&mut state))
    }

    async fn subscribe(
        &self,
        kind: EventKind,
        _since: BlockTag,
    ) -> Result<EventSubscription, LedgerError> {
        let (tx, subscription) = EventSubscription::channel(kind, 16);
        self.subscribers.lock().unwrap().push((kind, tx));
        Ok(subscription)
    }

    fn name(&self) -> &str {
        "MockLedger"
    }
}

// ============================================================================
// MockWallet
// ============================================================================

/// In-memory wallet whose changes are pushed by the test.
#[derive(Clone)]
pub struct MockWallet {
    accounts: Arc<Mutex<Vec<Address>>>,
    chain_id: Arc<Mutex<u64>>,
    watchers: Arc<Mutex<Vec<mpsc::Sender<WalletEvent>>>>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Self {
        Self {
            accounts: Arc::new(Mutex::new(accounts)),
            chain_id: Arc::new(Mutex::new(chain_id)),
            watchers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn change_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts.clone();
        self.notify(WalletEvent::AccountsChanged(accounts)).await;
    }

    pub async fn change_chain(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
        self.notify(WalletEvent::ChainChanged(chain_id)).await;
    }

    async fn notify(&self, event: WalletEvent) {
        let watchers: Vec<_> = self.watchers.lock().unwrap().clone();
        for tx in watchers {
            let _ = tx.send(event.clone()).await;
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn chain_id(&self) -> Result<u64, LedgerError> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn watch(&self) -> Result<WalletWatch, LedgerError> {
        let (tx, watch) = WalletWatch::channel(8);
        self.watchers.lock().unwrap().push(tx);
        Ok(watch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[tokio::test]
    async fn test_mock_ledger_round() {
        let manager = addr(0xaa);
        let ledger = MockLedger::new(manager);

        assert!(ledger.read_role(manager).await.unwrap().is_manager());
        assert!(ledger.read_roster_slot(0).await.unwrap_err().is_slot_unavailable());

        for byte in 1..=3 {
            ledger.submit_entry(addr(byte), crate::entry_fee()).await.unwrap();
        }
        assert_eq!(ledger.read_balance().await.unwrap(), crate::ether(3));
        assert_eq!(ledger.read_roster_slot(2).await.unwrap(), addr(3));

        let err = ledger.submit_select_winner(addr(1)).await.unwrap_err();
        assert!(err.message.contains("Not Authorized"));

        let receipt = ledger.submit_select_winner(manager).await.unwrap();
        assert!(receipt.block_number > 1);
        assert_eq!(ledger.read_balance().await.unwrap(), Wei::zero());
        assert_eq!(ledger.counters().entries, 3);
        assert_eq!(ledger.counters().selections, 2);
    }

    #[tokio::test]
    async fn test_zero_sentinel_and_slot_failures() {
        let ledger = MockLedger::new(addr(0xaa))
            .with_participants(&[addr(1)])
            .with_zero_sentinel();
        ledger.fail_slot_once(0, LedgerError::transport("timeout"));

        assert!(ledger.read_roster_slot(0).await.unwrap_err().is_transient());
        assert_eq!(ledger.read_roster_slot(0).await.unwrap(), addr(1));
        assert_eq!(ledger.read_roster_slot(1).await.unwrap(), Address::ZERO);
    }

    #[tokio::test]
    async fn test_emit_reaches_matching_subscribers_only() {
        let ledger = MockLedger::new(addr(0xaa));
        let mut entries = ledger
            .subscribe(EventKind::ParticipantEntered, BlockTag::Latest)
            .await
            .unwrap();
        let _winners = ledger
            .subscribe(EventKind::WinnerSelected, BlockTag::Latest)
            .await
            .unwrap();

        let event = LedgerEvent::ParticipantEntered {
            participant: addr(1),
            origin: ledger.origin(1, 0),
        };
        ledger.emit(event.clone()).await;

        assert_eq!(entries.next().await.unwrap().unwrap(), event);
        assert_eq!(ledger.subscriber_count(EventKind::WinnerSelected), 1);

        ledger.close_subscriptions(EventKind::ParticipantEntered);
        assert!(entries.next().await.is_none());
    }
}
