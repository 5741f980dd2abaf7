//! Connected account and the ledger it talks to.

use std::sync::Arc;

use client_blockchain_core::{Address, LedgerError, LotteryLedger, WalletProvider};

use crate::api::{Result, RuntimeError};

/// Everything a session runtime needs to know about the connection.
///
/// A session is immutable. When the wallet switches account or chain the
/// session is discarded and a new one is connected.
#[derive(Clone)]
pub struct Session {
    account: Address,
    chain_id: u64,
    ledger: Arc<dyn LotteryLedger>,
}

impl Session {
    pub fn new(account: Address, chain_id: u64, ledger: Arc<dyn LotteryLedger>) -> Self {
        Self {
            account,
            chain_id,
            ledger,
        }
    }

    /// Ask the wallet for accounts and bind the first one.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Connection`] if the wallet fails or exposes no
    /// account.
    pub async fn connect(
        wallet: &dyn WalletProvider,
        ledger: Arc<dyn LotteryLedger>,
    ) -> Result<Self> {
        let accounts = wallet
            .request_accounts()
            .await
            .map_err(RuntimeError::Connection)?;
        let account = accounts.first().copied().ok_or_else(|| {
            RuntimeError::Connection(LedgerError::connection("wallet exposed no accounts"))
        })?;
        let chain_id = wallet.chain_id().await.map_err(RuntimeError::Connection)?;

        tracing::info!(
            target: "runtime::session",
            account = %account,
            chain_id,
            ledger = ledger.name(),
            "session connected"
        );

        Ok(Self::new(account, chain_id, ledger))
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn ledger(&self) -> Arc<dyn LotteryLedger> {
        Arc::clone(&self.ledger)
    }
}
