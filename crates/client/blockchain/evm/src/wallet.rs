//! Node-managed accounts as a wallet provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use client_blockchain_core::{Address, LedgerError, WalletEvent, WalletProvider, WalletWatch};
use serde_json::json;
use tokio::time::MissedTickBehavior;

use crate::abi;
use crate::error::RpcError;
use crate::rpc::RpcClient;

/// Wallet backed by the accounts the RPC endpoint manages.
///
/// Account and chain changes are detected by polling, since plain HTTP has no
/// push channel.
#[derive(Clone)]
pub struct EvmWallet {
    rpc: Arc<RpcClient>,
    poll_interval: Duration,
}

impl EvmWallet {
    pub fn new(rpc: Arc<RpcClient>, poll_interval: Duration) -> Self {
        Self { rpc, poll_interval }
    }

    async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.rpc.call("eth_accounts", json!([])).await
    }

    async fn current_chain(&self) -> Result<u64, RpcError> {
        let chain: String = self.rpc.call("eth_chainId", json!([])).await?;
        Ok(abi::parse_quantity(&chain)?)
    }
}

fn connection_error(error: RpcError) -> LedgerError {
    LedgerError::connection(error.to_string())
}

#[async_trait]
impl WalletProvider for EvmWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        let requested: Result<Vec<Address>, RpcError> =
            self.rpc.call("eth_requestAccounts", json!([])).await;

        match requested {
            Ok(accounts) => Ok(accounts),
            Err(error) if error.is_method_not_found() => {
                tracing::debug!(
                    target: "blockchain::evm",
                    "eth_requestAccounts unsupported, falling back to eth_accounts"
                );
                self.accounts().await.map_err(connection_error)
            }
            Err(error) => Err(connection_error(error)),
        }
    }

    async fn chain_id(&self) -> Result<u64, LedgerError> {
        self.current_chain().await.map_err(connection_error)
    }

    async fn watch(&self) -> Result<WalletWatch, LedgerError> {
        let mut accounts = self.accounts().await.map_err(connection_error)?;
        let mut chain = self.current_chain().await.map_err(connection_error)?;

        let (tx, watch) = WalletWatch::channel(8);
        let wallet = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(wallet.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }

                match wallet.accounts().await {
                    Ok(current) if current != accounts => {
                        accounts = current.clone();
                        if tx.send(WalletEvent::AccountsChanged(current)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(error) => {
                        tracing::warn!(
                            target: "blockchain::evm",
                            %error,
                            "wallet account poll failed"
                        );
                    }
                }

                match wallet.current_chain().await {
                    Ok(current) if current != chain => {
                        chain = current;
                        if tx.send(WalletEvent::ChainChanged(current)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(error) => {
                        tracing::warn!(
                            target: "blockchain::evm",
                            %error,
                            "wallet chain poll failed"
                        );
                    }
                }
            }
        });

        Ok(watch)
    }
}
