//! Top-level client orchestrating the session runtime and the frontend.
//!
//! # Architecture
//!
//! ```text
//! Client (Top-level container)
//!   ├─→ SessionBuilder (wallet + ledger backends, starts SessionRuntime)
//!   └─→ Frontend (UI layer, talks to the engine via EngineHandle only)
//! ```
//!
//! A session lives from a successful wallet connection until the wallet
//! reports an account or chain change. The whole session is then discarded
//! and a new one is connected from scratch.

mod builder;

pub use builder::ClientBuilder;

// Re-export Frontend trait from client-frontend-core
pub use client_frontend_core::Frontend;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use client_blockchain_core::{WalletEvent, WalletProvider, WalletWatch};
use client_bootstrap::{SessionBuilder, SessionSetup};

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. Client::builder() receives the session builder and the frontend
/// 2. Client::run() watches the wallet and connects a session
/// 3. The frontend runs against the session's EngineHandle
/// 4. On a wallet change the session is reset and step 2 repeats
/// 5. When the frontend returns, the session is reset and run() returns
///
/// A failed connection is logged and retried on the next wallet event or
/// after `retry_interval`, whichever comes first.
pub struct Client {
    sessions: SessionBuilder,
    frontend: Box<dyn Frontend>,
    retry_interval: Duration,
}

enum SessionEnd {
    Quit(Result<()>),
    WalletChanged(Option<WalletEvent>),
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Run sessions until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The wallet cannot be watched, or its notifications end
    /// - The frontend fails
    pub async fn run(mut self) -> Result<()> {
        let wallet = self.sessions.wallet();
        let mut wallet_events = wallet.watch().await.context("Failed to watch wallet")?;

        loop {
            let setup = match self.open_session(wallet.as_ref()).await {
                Ok(Some(setup)) => setup,
                Ok(None) => {
                    tracing::warn!("Wallet exposes no accounts; waiting for one to be connected");
                    wait_for_wallet(&mut wallet_events, None).await?;
                    continue;
                }
                Err(error) => {
                    tracing::error!(
                        error = format!("{error:#}"),
                        retry_in = ?self.retry_interval,
                        "Wallet connection failed"
                    );
                    wait_for_wallet(&mut wallet_events, Some(self.retry_interval)).await?;
                    continue;
                }
            };
            tracing::info!(
                account = %setup.session.account(),
                chain_id = setup.session.chain_id(),
                "Session started"
            );

            let end = tokio::select! {
                result = self.frontend.run(setup.handle()) => SessionEnd::Quit(result),
                event = wallet_events.next() => SessionEnd::WalletChanged(event),
            };
            setup.runtime.reset();

            match end {
                SessionEnd::Quit(result) => {
                    tracing::info!("Client shutdown complete");
                    return result;
                }
                SessionEnd::WalletChanged(Some(event)) => {
                    tracing::info!(?event, "Wallet changed; reconnecting");
                }
                SessionEnd::WalletChanged(None) => bail!("Wallet notifications ended"),
            }
        }
    }

    /// `Ok(None)` when the wallet is reachable but exposes no account.
    async fn open_session(&self, wallet: &dyn WalletProvider) -> Result<Option<SessionSetup>> {
        let accounts = wallet
            .request_accounts()
            .await
            .context("Failed to request wallet accounts")?;
        if accounts.is_empty() {
            return Ok(None);
        }

        self.sessions.connect().await.map(Some)
    }
}

/// Wait for the next wallet notification, or at most `limit`.
///
/// Fails only once the wallet stops sending notifications.
async fn wait_for_wallet(events: &mut WalletWatch, limit: Option<Duration>) -> Result<()> {
    let next = match limit {
        Some(limit) => match tokio::time::timeout(limit, events.next()).await {
            Ok(next) => next,
            Err(_) => return Ok(()),
        },
        None => events.next().await,
    };

    match next {
        Some(event) => {
            tracing::info!(?event, "Wallet changed");
            Ok(())
        }
        None => bail!("Wallet notifications ended"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use client_blockchain_core::{Address, LedgerError, MockLedger, MockWallet};
    use runtime::{EngineHandle, RuntimeConfig};

    use super::*;

    const MANAGER: Address = Address([0xaa; 20]);

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    /// Wallet change a scripted session performs before parking.
    enum WalletChange {
        Account(Address),
        Chain(u64),
        /// Expose no account, then `reconnect_as` a moment later.
        Disconnect { reconnect_as: Address },
    }

    /// Records every session's account and performs one scripted change per
    /// session; quits once the script is exhausted.
    struct ScriptedFrontend {
        wallet: MockWallet,
        script: VecDeque<WalletChange>,
        seen: Arc<Mutex<Vec<Address>>>,
    }

    impl ScriptedFrontend {
        fn new(wallet: &MockWallet, script: impl IntoIterator<Item = WalletChange>) -> Self {
            Self {
                wallet: wallet.clone(),
                script: script.into_iter().collect(),
                seen: Arc::default(),
            }
        }

        fn seen(&self) -> Arc<Mutex<Vec<Address>>> {
            Arc::clone(&self.seen)
        }
    }

    #[async_trait]
    impl Frontend for ScriptedFrontend {
        async fn run(&mut self, handle: EngineHandle) -> Result<()> {
            self.seen.lock().unwrap().push(handle.account());

            match self.script.pop_front() {
                None => return Ok(()),
                Some(WalletChange::Account(account)) => {
                    self.wallet.change_accounts(vec![account]).await
                }
                Some(WalletChange::Chain(chain_id)) => self.wallet.change_chain(chain_id).await,
                Some(WalletChange::Disconnect { reconnect_as }) => {
                    self.wallet.change_accounts(Vec::new()).await;
                    let wallet = self.wallet.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        wallet.change_accounts(vec![reconnect_as]).await;
                    });
                }
            }
            std::future::pending().await
        }
    }

    /// Wallet whose first few account and chain requests fail.
    struct FlakyWallet {
        inner: MockWallet,
        account_failures: AtomicUsize,
        chain_failures: AtomicUsize,
    }

    impl FlakyWallet {
        fn take_failure(remaining: &AtomicUsize) -> Result<(), LedgerError> {
            match remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)) {
                Ok(_) => Err(LedgerError::connection("provider temporarily unavailable")),
                Err(_) => Ok(()),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for FlakyWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
            Self::take_failure(&self.account_failures)?;
            self.inner.request_accounts().await
        }

        async fn chain_id(&self) -> Result<u64, LedgerError> {
            Self::take_failure(&self.chain_failures)?;
            self.inner.chain_id().await
        }

        async fn watch(&self) -> Result<WalletWatch, LedgerError> {
            self.inner.watch().await
        }
    }

    fn builder(ledger: MockLedger, wallet: impl WalletProvider + 'static) -> SessionBuilder {
        SessionBuilder::with_backends(
            RuntimeConfig::default(),
            Arc::new(ledger),
            Arc::new(wallet),
        )
    }

    async fn run_scripted(wallet: MockWallet, script: Vec<WalletChange>) -> Vec<Address> {
        let frontend = ScriptedFrontend::new(&wallet, script);
        let seen = frontend.seen();

        let client = Client::builder()
            .sessions(builder(MockLedger::new(MANAGER), wallet))
            .frontend(frontend)
            .build()
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), client.run())
            .await
            .expect("client should quit")
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        seen
    }

    #[tokio::test]
    async fn account_change_reconnects_with_the_new_account() {
        let wallet = MockWallet::new(vec![addr(1)], 1);

        let seen = run_scripted(wallet, vec![WalletChange::Account(addr(2))]).await;

        assert_eq!(seen, vec![addr(1), addr(2)]);
    }

    #[tokio::test]
    async fn chain_change_starts_a_fresh_session() {
        let wallet = MockWallet::new(vec![addr(1)], 1);

        let seen = run_scripted(wallet, vec![WalletChange::Chain(5)]).await;

        assert_eq!(seen, vec![addr(1), addr(1)]);
    }

    #[tokio::test]
    async fn empty_account_list_waits_for_the_next_account() {
        let wallet = MockWallet::new(vec![addr(1)], 1);

        let seen = run_scripted(
            wallet,
            vec![WalletChange::Disconnect {
                reconnect_as: addr(2),
            }],
        )
        .await;

        assert_eq!(seen, vec![addr(1), addr(2)]);
    }

    #[tokio::test]
    async fn failed_connection_is_retried_instead_of_ending_the_client() {
        let mock = MockWallet::new(vec![addr(1)], 1);
        let frontend = ScriptedFrontend::new(&mock, Vec::new());
        let seen = frontend.seen();
        let wallet = FlakyWallet {
            inner: mock,
            account_failures: AtomicUsize::new(1),
            chain_failures: AtomicUsize::new(1),
        };

        let client = Client::builder()
            .sessions(builder(MockLedger::new(MANAGER), wallet))
            .frontend(frontend)
            .retry_interval(Duration::from_millis(10))
            .build()
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), client.run())
            .await
            .expect("client should connect after retrying")
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![addr(1)]);
    }

    #[tokio::test]
    async fn build_requires_a_frontend() {
        let result = Client::builder()
            .sessions(builder(
                MockLedger::new(MANAGER),
                MockWallet::new(Vec::new(), 1),
            ))
            .build();

        assert!(result.is_err());
    }
}
