//! Contract log decoding and polling subscriptions.
//!
//! Subscriptions are emulated with `eth_getLogs` over a moving block window,
//! which works against any HTTP endpoint. Each poll covers
//! `[next_block, head]` and advances only after the logs were fetched, so a
//! failed poll is retried on the next tick (at-least-once delivery).

use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{
    Address, EventKind, EventOrigin, EventSender, LedgerError, LedgerEvent, WinnerRecord,
};
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::abi::{self, AbiError, Word, signatures};
use crate::rpc::RpcClient;

/// Log entry as returned by `eth_getLogs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    pub block_number: Option<String>,
    pub transaction_hash: Option<String>,
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

pub fn topic_for(kind: EventKind) -> Word {
    match kind {
        EventKind::ParticipantEntered => abi::event_topic(signatures::PARTICIPANTS_ENTERED),
        EventKind::WinnerSelected => abi::event_topic(signatures::WINNER_SELECTED),
    }
}

/// Decode a log of the given kind.
///
/// Indexed arguments are assumed to precede non-indexed ones, so the
/// arguments are read from `topics[1..]` followed by the data words. This
/// covers both the indexed and the plain declaration of either event.
pub fn decode_log(kind: EventKind, log: &RawLog) -> Result<LedgerEvent, AbiError> {
    let origin = decode_origin(log)?;

    let mut fields: Vec<Word> = log
        .topics
        .iter()
        .skip(1)
        .map(|topic| abi::decode_word(topic))
        .collect::<Result<_, _>>()?;
    if !log.data.is_empty() {
        fields.extend(abi::decode_words(&log.data)?);
    }

    match kind {
        EventKind::ParticipantEntered => {
            let participant = field(&fields, 0).map(abi::word_to_address)?;
            Ok(LedgerEvent::ParticipantEntered {
                participant,
                origin,
            })
        }
        EventKind::WinnerSelected => {
            let address = field(&fields, 0).map(abi::word_to_address)?;
            let amount = field(&fields, 1).map(abi::word_to_uint)?;
            Ok(LedgerEvent::WinnerSelected {
                record: WinnerRecord { address, amount },
                origin,
            })
        }
    }
}

fn field(fields: &[Word], index: usize) -> Result<&Word, AbiError> {
    fields.get(index).ok_or(AbiError::MissingWords {
        expected: index + 1,
        actual: fields.len(),
    })
}

fn decode_origin(log: &RawLog) -> Result<EventOrigin, AbiError> {
    let missing = |what: &str| AbiError::Quantity(format!("log without {what}"));

    let transaction = log
        .transaction_hash
        .as_deref()
        .ok_or_else(|| missing("transactionHash"))?;
    let log_index = log.log_index.as_deref().ok_or_else(|| missing("logIndex"))?;
    let block_number = log
        .block_number
        .as_deref()
        .ok_or_else(|| missing("blockNumber"))?;

    Ok(EventOrigin {
        transaction: abi::parse_transaction_id(transaction)?,
        log_index: abi::parse_quantity(log_index)?,
        block_number: abi::parse_quantity(block_number)?,
    })
}

/// Background task feeding one subscription.
pub(crate) struct LogPoller {
    pub rpc: Arc<RpcClient>,
    pub contract: Address,
    pub kind: EventKind,
    pub next_block: u64,
    pub interval: Duration,
    pub tx: EventSender,
}

impl LogPoller {
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        let topic = abi::to_hex(&topic_for(self.kind));
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(
            target: "blockchain::evm",
            kind = %self.kind,
            from_block = self.next_block,
            "log subscription started"
        );

        loop {
            ticker.tick().await;
            if self.tx.is_closed() {
                break;
            }

            match self.poll_once(&topic).await {
                Ok(events) => {
                    for event in events {
                        if self.tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
                Err(error) => {
                    if self.tx.send(Err(error)).await.is_err() {
                        return;
                    }
                }
            }
        }

        tracing::debug!(target: "blockchain::evm", kind = %self.kind, "log subscription dropped");
    }

    /// Fetch every log in `[next_block, head]`. Undecodable logs are
    /// returned as errors in place, the rest as events.
    async fn poll_once(
        &mut self,
        topic: &str,
    ) -> Result<Vec<Result<LedgerEvent, LedgerError>>, LedgerError> {
        let head: String = self
            .rpc
            .call("eth_blockNumber", json!([]))
            .await
            .map_err(|e| LedgerError::transport(e.to_string()))?;
        let head = abi::parse_quantity(&head).map_err(|e| LedgerError::decode(e.to_string()))?;

        if head < self.next_block {
            return Ok(Vec::new());
        }

        let filter = json!({
            "address": self.contract,
            "fromBlock": abi::format_block(self.next_block),
            "toBlock": abi::format_block(head),
            "topics": [topic],
        });
        let logs: Vec<RawLog> = self
            .rpc
            .call("eth_getLogs", json!([filter]))
            .await
            .map_err(|e| LedgerError::transport(e.to_string()))?;

        self.next_block = head + 1;

        Ok(logs
            .iter()
            .filter(|log| !log.removed)
            .map(|log| decode_log(self.kind, log).map_err(|e| LedgerError::decode(e.to_string())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::{TransactionId, ether};

    fn word_hex(fill: &str) -> String {
        format!("{}{}", "0".repeat(64 - fill.len()), fill)
    }

    fn raw_log(topics: Vec<String>, data: String) -> RawLog {
        RawLog {
            topics,
            data,
            block_number: Some("0x10".to_string()),
            transaction_hash: Some(format!("0x{}", "11".repeat(32))),
            log_index: Some("0x2".to_string()),
            removed: false,
        }
    }

    #[test]
    fn participant_entered_from_data() {
        let topic = abi::to_hex(&topic_for(EventKind::ParticipantEntered));
        let log = raw_log(vec![topic], format!("0x{}", word_hex(&"ab".repeat(20))));

        let event = decode_log(EventKind::ParticipantEntered, &log).unwrap();

        assert_eq!(
            event,
            LedgerEvent::ParticipantEntered {
                participant: Address([0xab; 20]),
                origin: EventOrigin {
                    transaction: TransactionId([0x11; 32]),
                    log_index: 2,
                    block_number: 16,
                },
            }
        );
    }

    #[test]
    fn winner_selected_indexed_and_plain_layouts_agree() {
        let topic = abi::to_hex(&topic_for(EventKind::WinnerSelected));
        let winner = word_hex(&"cd".repeat(20));
        let amount = word_hex("1bc16d674ec80000");

        let plain = raw_log(vec![topic.clone()], format!("0x{winner}{amount}"));
        let indexed = raw_log(vec![topic, format!("0x{winner}")], format!("0x{amount}"));

        let expected = WinnerRecord {
            address: Address([0xcd; 20]),
            amount: ether(2),
        };
        for log in [plain, indexed] {
            match decode_log(EventKind::WinnerSelected, &log).unwrap() {
                LedgerEvent::WinnerSelected { record, .. } => assert_eq!(record, expected),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn incomplete_logs_are_rejected() {
        let topic = abi::to_hex(&topic_for(EventKind::WinnerSelected));
        let short = raw_log(vec![topic], format!("0x{}", word_hex("01")));
        assert!(matches!(
            decode_log(EventKind::WinnerSelected, &short),
            Err(AbiError::MissingWords { expected: 2, actual: 1 })
        ));

        let mut pending = raw_log(vec![], String::new());
        pending.transaction_hash = None;
        assert!(decode_log(EventKind::ParticipantEntered, &pending).is_err());
    }
}
