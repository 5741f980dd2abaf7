//! Atomic snapshot construction.

use std::sync::Arc;

use client_blockchain_core::{Address, LedgerError, LotteryLedger, LotterySnapshot};

use super::scanner::RosterScanner;
use crate::api::{Result, RuntimeError};

/// Reads the manager, balance, and roster concurrently into one snapshot.
///
/// A build either yields a complete snapshot or fails as a whole; nothing
/// read during a failed build is ever published.
#[derive(Clone)]
pub struct SnapshotBuilder {
    ledger: Arc<dyn LotteryLedger>,
    scanner: RosterScanner,
}

impl SnapshotBuilder {
    pub fn new(ledger: Arc<dyn LotteryLedger>, scanner: RosterScanner) -> Self {
        Self { ledger, scanner }
    }

    /// Build a fresh snapshot for `account`. The winner is always unset.
    pub async fn build(&self, account: Address) -> Result<LotterySnapshot> {
        let ledger = self.ledger.as_ref();

        let (manager, prize_pool, roster) = tokio::try_join!(
            ledger.read_manager(),
            ledger.read_balance(),
            async { Ok::<_, LedgerError>(self.scanner.scan(ledger).await) },
        )
        .map_err(RuntimeError::SnapshotUnavailable)?;

        Ok(LotterySnapshot::new(account, manager, prize_pool, roster))
    }
}
