//! EVM lottery ledger client.
//!
//! Reads go through `eth_call`/`eth_getBalance`. Submissions use
//! `eth_sendTransaction`, so the node (or the wallet in front of it) signs
//! for the connected account, then wait for the receipt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use client_blockchain_core::{
    Address, BlockTag, EventKind, EventSubscription, LedgerConfig, LedgerError, LotteryLedger,
    TxReceipt, Wei,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::Instant;

use crate::abi::{self, signatures};
use crate::config::EvmConfig;
use crate::error::{Result, RpcError};
use crate::events::LogPoller;
use crate::rpc::RpcClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    block_number: Option<String>,
    status: Option<String>,
}

/// Lottery contract client over JSON-RPC.
pub struct EvmLedgerClient {
    config: EvmConfig,
    rpc: Arc<RpcClient>,
}

impl EvmLedgerClient {
    /// Create a new EVM ledger client.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid or the HTTP client cannot be
    /// built. No request is sent until the first read.
    pub fn new(config: EvmConfig) -> Result<Self> {
        config.validate().map_err(RpcError::InvalidConfig)?;
        let rpc = RpcClient::new(config.rpc_url.clone(), config.request_timeout)?;

        Ok(Self {
            config,
            rpc: Arc::new(rpc),
        })
    }

    /// Shared transport, e.g. for an [`crate::EvmWallet`] on the same node.
    pub fn rpc(&self) -> Arc<RpcClient> {
        Arc::clone(&self.rpc)
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    async fn eth_call(&self, data: String) -> Result<String> {
        let call = json!({
            "to": self.config.contract,
            "data": data,
        });
        self.rpc.call("eth_call", json!([call, "latest"])).await
    }

    async fn block_number(&self) -> Result<u64> {
        let head: String = self.rpc.call("eth_blockNumber", json!([])).await?;
        Ok(abi::parse_quantity(&head)?)
    }

    /// Send a node-signed transaction and wait until it is mined.
    async fn send_and_confirm(&self, tx: Value) -> std::result::Result<TxReceipt, LedgerError> {
        let hash: String = self
            .rpc
            .call("eth_sendTransaction", json!([tx]))
            .await
            .map_err(LedgerError::from)?;
        let transaction =
            abi::parse_transaction_id(&hash).map_err(|e| LedgerError::decode(e.to_string()))?;

        tracing::info!(
            target: "blockchain::evm",
            tx = %transaction,
            "transaction submitted, waiting for receipt"
        );

        let deadline = Instant::now() + self.config.receipt_timeout;
        loop {
            let receipt: Option<RawReceipt> = self
                .rpc
                .call("eth_getTransactionReceipt", json!([hash]))
                .await
                .map_err(read_error)?;

            if let Some(receipt) = receipt
                && let Some(block) = receipt.block_number.as_deref()
            {
                if receipt.status.as_deref() == Some("0x0") {
                    tracing::warn!(
                        target: "blockchain::evm",
                        tx = %transaction,
                        "transaction reverted"
                    );
                    return Err(LedgerError::rejected("transaction reverted"));
                }

                let block_number =
                    abi::parse_quantity(block).map_err(|e| LedgerError::decode(e.to_string()))?;
                return Ok(TxReceipt {
                    transaction,
                    block_number,
                });
            }

            if Instant::now() >= deadline {
                return Err(LedgerError::transport(format!(
                    "no receipt for {} after {:?}",
                    transaction.short(),
                    self.config.receipt_timeout
                )));
            }
            tokio::time::sleep(self.config.receipt_poll_interval).await;
        }
    }
}

/// A node-side error on a read is not a contract rejection.
fn read_error(error: RpcError) -> LedgerError {
    match error {
        RpcError::Remote { .. } => LedgerError::transport(error.to_string()),
        other => other.into(),
    }
}

#[async_trait]
impl LotteryLedger for EvmLedgerClient {
    async fn read_manager(&self) -> std::result::Result<Address, LedgerError> {
        let data = abi::encode_call(signatures::MANAGER, &[]);
        let output = self.eth_call(data).await.map_err(read_error)?;
        abi::decode_address_return(&output).map_err(|e| LedgerError::decode(e.to_string()))
    }

    async fn read_balance(&self) -> std::result::Result<Wei, LedgerError> {
        let balance: String = self
            .rpc
            .call(
                "eth_getBalance",
                json!([self.config.contract, "latest"]),
            )
            .await
            .map_err(read_error)?;
        abi::parse_wei(&balance).map_err(|e| LedgerError::decode(e.to_string()))
    }

    async fn read_roster_slot(&self, index: u64) -> std::result::Result<Address, LedgerError> {
        let data = abi::encode_call(
            signatures::PARTICIPANTS,
            &[abi::encode_uint(Wei::from(index))],
        );

        match self.eth_call(data).await {
            Ok(output) if output.len() <= 2 => Err(LedgerError::slot_unavailable(index)),
            Ok(output) => abi::decode_address_return(&output)
                .map_err(|e| LedgerError::decode(e.to_string())),
            // Reading past the end of a dynamic array reverts.
            Err(RpcError::Remote { .. }) => Err(LedgerError::slot_unavailable(index)),
            Err(other) => Err(other.into()),
        }
    }

    async fn submit_entry(
        &self,
        account: Address,
        fee: Wei,
    ) -> std::result::Result<TxReceipt, LedgerError> {
        let tx = json!({
            "from": account,
            "to": self.config.contract,
            "value": abi::format_quantity(fee),
        });
        self.send_and_confirm(tx).await
    }

    async fn submit_select_winner(
        &self,
        account: Address,
    ) -> std::result::Result<TxReceipt, LedgerError> {
        let tx = json!({
            "from": account,
            "to": self.config.contract,
            "data": abi::encode_call(signatures::SELECT_WINNER, &[]),
        });
        self.send_and_confirm(tx).await
    }

    async fn subscribe(
        &self,
        kind: EventKind,
        since: BlockTag,
    ) -> std::result::Result<EventSubscription, LedgerError> {
        let next_block = match since {
            BlockTag::Latest => self.block_number().await.map_err(read_error)? + 1,
            BlockTag::Number(number) => number,
        };

        let (tx, subscription) = EventSubscription::channel(kind, self.config.subscription_buffer);
        LogPoller {
            rpc: self.rpc(),
            contract: self.config.contract,
            kind,
            next_block,
            interval: poll_interval(&self.config),
            tx,
        }
        .spawn();

        Ok(subscription)
    }

    fn name(&self) -> &str {
        "EVM"
    }
}

fn poll_interval(config: &EvmConfig) -> Duration {
    config.event_poll_interval.max(Duration::from_millis(10))
}
