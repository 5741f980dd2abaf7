//! Ledger abstraction layer for the lottery client.
//!
//! This crate provides the chain-agnostic vocabulary shared by every other
//! crate in the workspace.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: LotteryLedger + WalletProvider (lottery domain)
//!          ├── manager / balance / roster slot reads
//!          ├── entry and winner-selection submissions
//!          └── push-event subscriptions
//!
//! Layer 0: Domain types (Address, Wei, LotterySnapshot, Trigger, ...)
//! ```
//!
//! Concrete chains (see `client-blockchain-evm`) implement the Layer 1 traits.
//! The runtime only ever talks to `dyn LotteryLedger`.
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{LotteryLedger, MAX_PARTICIPANTS};
//!
//! async fn first_participant(ledger: &dyn LotteryLedger) -> Option<Address> {
//!     ledger.read_roster_slot(0).await.ok().filter(|a| !a.is_zero())
//! }
//! ```

pub mod lottery;
pub mod stream;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use lottery::{
    LotteryRole, LotterySnapshot, ParticipantRoster, RosterError, Trigger, WinnerRecord,
};
pub use stream::{EventSender, EventSubscription, WalletWatch};
pub use traits::{LedgerError, LedgerErrorKind, LotteryLedger, WalletProvider};
pub use types::{
    Address, AddressParseError, BlockTag, ENTRY_FEE_ETHER, EventKind, EventOrigin, LedgerConfig,
    LedgerEvent, MAX_PARTICIPANTS, MIN_PARTICIPANTS_FOR_DRAW, TransactionId, TxReceipt,
    WEI_PER_ETHER, WalletEvent, Wei, entry_fee, ether,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCounters, MockLedger, MockWallet};
