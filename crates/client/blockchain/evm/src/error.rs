//! Error types for EVM JSON-RPC operations.

use client_blockchain_core::LedgerError;
use thiserror::Error;

/// Errors that can occur while talking to an EVM node.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("RPC error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("invalid RPC response: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RpcError {
    /// JSON-RPC code for an unsupported method.
    pub const METHOD_NOT_FOUND: i64 = -32601;

    pub fn is_method_not_found(&self) -> bool {
        matches!(self, RpcError::Remote { code, .. } if *code == Self::METHOD_NOT_FOUND)
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(error: reqwest::Error) -> Self {
        RpcError::Http(error.to_string())
    }
}

impl From<crate::abi::AbiError> for RpcError {
    fn from(error: crate::abi::AbiError) -> Self {
        RpcError::Decode(error.to_string())
    }
}

/// Default mapping. A remote error keeps the node's message verbatim so
/// revert reasons survive for classification.
impl From<RpcError> for LedgerError {
    fn from(error: RpcError) -> Self {
        match error {
            RpcError::Http(message) => LedgerError::transport(message),
            RpcError::Remote { message, .. } => LedgerError::rejected(message),
            RpcError::Decode(message) => LedgerError::decode(message),
            RpcError::InvalidConfig(message) => LedgerError::connection(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
