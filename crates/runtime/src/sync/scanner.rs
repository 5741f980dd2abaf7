//! Sequential roster enumeration.
//!
//! The contract exposes participants only through an indexed getter, so the
//! roster is read slot by slot until the first sign that the populated range
//! ended. Scanning never fails: whatever was read before the stop is the
//! roster.

use client_blockchain_core::{
    Address, LedgerError, LotteryLedger, MAX_PARTICIPANTS, ParticipantRoster,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct RosterScanner {
    transient_retries: u32,
}

impl RosterScanner {
    /// Scanner that re-reads a slot up to `transient_retries` times after a
    /// transport failure before giving up on the rest of the roster.
    pub fn new(transient_retries: u32) -> Self {
        Self { transient_retries }
    }

    /// Read slots `0..MAX_PARTICIPANTS` in order.
    ///
    /// Stops at the first zero address, the first unavailable slot, the first
    /// read that keeps failing, or the cap.
    pub async fn scan(&self, ledger: &dyn LotteryLedger) -> ParticipantRoster {
        let mut roster = ParticipantRoster::new();

        for index in 0..MAX_PARTICIPANTS as u64 {
            match self.read_slot(ledger, index).await {
                Ok(address) if address.is_zero() => {
                    debug!(target: "runtime::scanner", index, "zero address ends roster");
                    break;
                }
                Ok(address) => {
                    if roster.push(address).is_err() {
                        break;
                    }
                }
                Err(error) if error.is_slot_unavailable() => {
                    debug!(target: "runtime::scanner", index, "roster ends at unavailable slot");
                    break;
                }
                Err(error) => {
                    warn!(
                        target: "runtime::scanner",
                        index,
                        %error,
                        "roster read failed, keeping {} participants",
                        roster.len()
                    );
                    break;
                }
            }
        }

        roster
    }

    async fn read_slot(
        &self,
        ledger: &dyn LotteryLedger,
        index: u64,
    ) -> Result<Address, LedgerError> {
        let mut attempt = 0;
        loop {
            match ledger.read_roster_slot(index).await {
                Err(error) if error.is_transient() && attempt < self.transient_retries => {
                    attempt += 1;
                    debug!(
                        target: "runtime::scanner",
                        index,
                        attempt,
                        %error,
                        "retrying slot read"
                    );
                }
                result => return result,
            }
        }
    }
}

impl Default for RosterScanner {
    fn default() -> Self {
        Self::new(1)
    }
}
