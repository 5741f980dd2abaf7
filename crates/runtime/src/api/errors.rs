//! Unified error types surfaced by the runtime API.
//!
//! Wraps ledger failures and worker coordination failures so clients can
//! bubble them up with consistent context.
use client_blockchain_core::{LedgerError, LedgerErrorKind};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("wallet connection failed")]
    Connection(#[source] LedgerError),

    #[error("snapshot unavailable")]
    SnapshotUnavailable(#[source] LedgerError),

    #[error("transaction rejected: {}", .0.message)]
    Rejected(#[source] LedgerError),

    /// The submission never produced a verdict (wallet, transport, decode).
    #[error("transaction not confirmed")]
    Submission(#[source] LedgerError),

    #[error("reconciliation engine stopped")]
    EngineStopped,

    #[error("reconciliation engine reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),
}

impl RuntimeError {
    /// Only a contract rejection carries a reason worth classifying.
    pub fn from_submission(error: LedgerError) -> Self {
        match error.kind {
            LedgerErrorKind::Rejected => RuntimeError::Rejected(error),
            _ => RuntimeError::Submission(error),
        }
    }

    /// Raw remote text of a rejected submission.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            RuntimeError::Rejected(error) => Some(&error.message),
            _ => None,
        }
    }
}
