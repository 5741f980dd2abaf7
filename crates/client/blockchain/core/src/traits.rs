//! Ledger abstraction traits.
//!
//! - `LotteryLedger`: typed façade over the contract's reads, writes, and events
//! - `WalletProvider`: account access and change notifications

use async_trait::async_trait;

use crate::lottery::LotteryRole;
use crate::stream::{EventSubscription, WalletWatch};
use crate::types::{Address, BlockTag, EventKind, TxReceipt, Wei};

// ============================================================================
// Error Types
// ============================================================================

/// Broad classification of a ledger failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum LedgerErrorKind {
    /// Wallet or provider unavailable, or the user refused access.
    #[strum(to_string = "connection error")]
    Connection,

    /// Network-level failure that may succeed on retry.
    #[strum(to_string = "transport error")]
    Transport,

    /// Roster slot past the populated range.
    #[strum(to_string = "slot unavailable")]
    SlotUnavailable,

    /// The contract refused a submitted transaction.
    #[strum(to_string = "rejected")]
    Rejected,

    /// Response could not be decoded.
    #[strum(to_string = "decode error")]
    Decode,
}

/// Failure of any ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct LedgerError {
    pub kind: LedgerErrorKind,
    pub message: String,
}

impl LedgerError {
    pub fn new(kind: LedgerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Connection, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Transport, message)
    }

    pub fn slot_unavailable(index: u64) -> Self {
        Self::new(
            LedgerErrorKind::SlotUnavailable,
            format!("roster slot {index} is not populated"),
        )
    }

    /// The raw remote reason is kept verbatim for later classification.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Rejected, reason)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Decode, message)
    }

    pub fn is_transient(&self) -> bool {
        self.kind == LedgerErrorKind::Transport
    }

    pub fn is_slot_unavailable(&self) -> bool {
        self.kind == LedgerErrorKind::SlotUnavailable
    }
}

// ============================================================================
// Lottery Domain Traits
// ============================================================================

/// Remote lottery contract.
///
/// Every method may suspend on network I/O. Timeouts belong to the
/// implementation's transport.
#[async_trait]
pub trait LotteryLedger: Send + Sync {
    /// Read the contract's manager address.
    async fn read_manager(&self) -> Result<Address, LedgerError>;

    /// Read the manager and compare it with `account`.
    async fn read_role(&self, account: Address) -> Result<LotteryRole, LedgerError> {
        let manager = self.read_manager().await?;
        Ok(LotteryRole::for_account(manager, account))
    }

    /// Current prize pool held by the contract.
    async fn read_balance(&self) -> Result<Wei, LedgerError>;

    /// Read one roster slot.
    ///
    /// Past the populated range this either returns [`Address::ZERO`] or fails
    /// with [`LedgerErrorKind::SlotUnavailable`], depending on the contract.
    async fn read_roster_slot(&self, index: u64) -> Result<Address, LedgerError>;

    /// Submit a value-bearing entry from `account`.
    async fn submit_entry(&self, account: Address, fee: Wei) -> Result<TxReceipt, LedgerError>;

    /// Submit the manager-gated winner selection from `account`.
    async fn submit_select_winner(&self, account: Address) -> Result<TxReceipt, LedgerError>;

    /// Open a push-event stream of `kind` starting at `since`.
    ///
    /// The stream is lazy, infinite, and cannot be restarted. Deliveries are
    /// at-least-once and may be arbitrarily delayed.
    async fn subscribe(
        &self,
        kind: EventKind,
        since: BlockTag,
    ) -> Result<EventSubscription, LedgerError>;

    /// Get the ledger name (e.g., "EVM").
    fn name(&self) -> &str;
}

/// Wallet/account provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request access to the user's accounts. The first entry is active.
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError>;

    /// Identifier of the network the wallet is connected to.
    async fn chain_id(&self) -> Result<u64, LedgerError>;

    /// Start watching for account and chain changes.
    async fn watch(&self) -> Result<WalletWatch, LedgerError>;
}
