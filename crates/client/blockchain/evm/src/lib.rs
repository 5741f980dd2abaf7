//! EVM JSON-RPC integration for the lottery client.
//!
//! This crate talks to an Ethereum-compatible node and implements the
//! chain-agnostic traits from `client-blockchain-core`:
//! - [`EvmLedgerClient`] implements `LotteryLedger` (contract reads,
//!   node-signed submissions, log-polling subscriptions)
//! - [`EvmWallet`] implements `WalletProvider` (node-managed accounts, polled
//!   for account and chain changes)
//!
//! # Architecture
//!
//! ```text
//! EvmLedgerClient / EvmWallet
//!          ↓
//!     abi (selectors, words)     events (log decoding, poller)
//!          ↓                          ↓
//!                 RpcClient (reqwest, JSON-RPC 2.0)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_evm::{EvmConfig, EvmLedgerClient, EvmWallet};
//!
//! let config = EvmConfig::from_env()?;
//! let ledger = EvmLedgerClient::new(config.clone())?;
//! let wallet = EvmWallet::new(ledger.rpc(), config.wallet_poll_interval);
//! let manager = ledger.read_manager().await?;
//! ```

pub mod abi;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod rpc;
pub mod wallet;

pub use client::EvmLedgerClient;
pub use config::EvmConfig;
pub use error::{Result, RpcError};
pub use rpc::RpcClient;
pub use wallet::EvmWallet;
