//! Minimal JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{Result, RpcError};

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Shared JSON-RPC transport. Cheap to share behind an `Arc`.
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invoke `method` and decode its `result`.
    ///
    /// A `null` result decodes into `T` as-is, so `Option<_>` targets see
    /// `None` for pending receipts.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!(target: "blockchain::evm", id, method, "rpc request");

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http(format!("{method} returned HTTP {status}")));
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(format!("{method}: {e}")))?;

        decode_envelope(method, envelope)
    }
}

fn decode_envelope<T: DeserializeOwned>(method: &str, envelope: RpcEnvelope) -> Result<T> {
    if let Some(error) = envelope.error {
        return Err(RpcError::Remote {
            code: error.code,
            message: error.message,
        });
    }

    serde_json::from_value(envelope.result.unwrap_or(Value::Null))
        .map_err(|e| RpcError::Decode(format!("{method}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(raw: &str) -> RpcEnvelope {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn remote_errors_keep_message() {
        let env = envelope(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted: Manager cant Participate"}}"#,
        );
        let err = decode_envelope::<String>("eth_sendTransaction", env).unwrap_err();

        match err {
            RpcError::Remote { code, message } => {
                assert_eq!(code, 3);
                assert!(message.contains("Manager cant Participate"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn null_result_decodes_as_none() {
        let env = envelope(r#"{"jsonrpc":"2.0","id":1,"result":null}"#);
        let receipt: Option<Value> = decode_envelope("eth_getTransactionReceipt", env).unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn method_not_found_is_detected() {
        let env = envelope(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#,
        );
        let err = decode_envelope::<Vec<String>>("eth_requestAccounts", env).unwrap_err();
        assert!(err.is_method_not_found());
    }
}
