//! Connects the wallet and starts the engine for one session.
use std::sync::Arc;

use anyhow::{Context, Result};
use client_blockchain_core::{LotteryLedger, WalletProvider};
use client_blockchain_evm::{EvmLedgerClient, EvmWallet};
use runtime::{EngineHandle, RuntimeConfig, Session, SessionRuntime};

use crate::config::ClientConfig;

/// Builder that owns the ledger and wallet backends and produces sessions.
///
/// One builder outlives many sessions: every wallet change tears the current
/// session down and asks the builder for a fresh one.
#[derive(Clone)]
pub struct SessionBuilder {
    runtime_config: RuntimeConfig,
    ledger: Arc<dyn LotteryLedger>,
    wallet: Arc<dyn WalletProvider>,
}

impl SessionBuilder {
    /// Backends talking to the configured EVM node.
    pub fn evm(config: &ClientConfig) -> Result<Self> {
        let ledger = EvmLedgerClient::new(config.evm.clone())
            .context("Failed to initialize EVM ledger client")?;
        let wallet = EvmWallet::new(ledger.rpc(), config.evm.wallet_poll_interval);

        tracing::info!(
            network = %config.evm.network,
            rpc_url = %config.evm.rpc_url,
            contract = %config.evm.contract,
            "EVM backends ready"
        );

        Ok(Self::with_backends(
            config.runtime.clone(),
            Arc::new(ledger),
            Arc::new(wallet),
        ))
    }

    /// Use caller-provided backends (e.g., in-memory mocks).
    pub fn with_backends(
        runtime_config: RuntimeConfig,
        ledger: Arc<dyn LotteryLedger>,
        wallet: Arc<dyn WalletProvider>,
    ) -> Self {
        Self {
            runtime_config,
            ledger,
            wallet,
        }
    }

    pub fn wallet(&self) -> Arc<dyn WalletProvider> {
        Arc::clone(&self.wallet)
    }

    /// Ask the wallet for its active account and start a session runtime.
    pub async fn connect(&self) -> Result<SessionSetup> {
        let session = Session::connect(self.wallet.as_ref(), Arc::clone(&self.ledger))
            .await
            .context("Failed to connect wallet")?;
        let runtime = SessionRuntime::start(&session, &self.runtime_config)
            .await
            .context("Failed to start session runtime")?;

        Ok(SessionSetup { session, runtime })
    }
}

/// A connected session and the tasks serving it.
pub struct SessionSetup {
    pub session: Session,
    pub runtime: SessionRuntime,
}

impl SessionSetup {
    pub fn handle(&self) -> EngineHandle {
        self.runtime.handle()
    }
}
