//! Lottery domain model: roles, roster, snapshots, and reconciliation triggers.

use arrayvec::ArrayVec;

use crate::types::{Address, EventOrigin, LedgerEvent, MAX_PARTICIPANTS, TxReceipt, Wei};

/// Role of the connected account relative to the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum LotteryRole {
    /// No account connected yet.
    #[default]
    Unset,
    Manager,
    Participant,
}

impl LotteryRole {
    /// Derive the role of `account` given the contract's manager.
    pub fn for_account(manager: Address, account: Address) -> Self {
        if account.is_zero() {
            LotteryRole::Unset
        } else if manager == account {
            LotteryRole::Manager
        } else {
            LotteryRole::Participant
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, LotteryRole::Manager)
    }
}

// ============================================================================
// ParticipantRoster
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("zero address is a sentinel and cannot be a participant")]
    ZeroAddress,

    #[error("roster already holds the maximum number of participants")]
    Full,
}

/// Participants in ledger slot order, never longer than [`MAX_PARTICIPANTS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRoster(ArrayVec<Address, MAX_PARTICIPANTS>);

impl ParticipantRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_addresses<I>(addresses: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = Address>,
    {
        let mut roster = Self::new();
        for address in addresses {
            roster.push(address)?;
        }
        Ok(roster)
    }

    pub fn push(&mut self, address: Address) -> Result<(), RosterError> {
        if address.is_zero() {
            return Err(RosterError::ZeroAddress);
        }
        self.0.try_push(address).map_err(|_| RosterError::Full)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.0.is_full()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    pub fn as_slice(&self) -> &[Address] {
        self.0.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Outcome of a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinnerRecord {
    pub address: Address,
    pub amount: Wei,
}

/// Consistent view of the lottery as of one reconciliation pass.
///
/// Snapshots are never mutated; every refresh produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotterySnapshot {
    account: Address,
    role: LotteryRole,
    manager: Address,
    prize_pool: Wei,
    roster: ParticipantRoster,
    winner: Option<WinnerRecord>,
}

impl LotterySnapshot {
    /// Assemble a snapshot from fresh reads. The winner is never part of a
    /// fresh read; attach it with [`LotterySnapshot::with_winner`].
    pub fn new(
        account: Address,
        manager: Address,
        prize_pool: Wei,
        roster: ParticipantRoster,
    ) -> Self {
        Self {
            account,
            role: LotteryRole::for_account(manager, account),
            manager,
            prize_pool,
            roster,
            winner: None,
        }
    }

    pub fn with_winner(self, winner: Option<WinnerRecord>) -> Self {
        Self { winner, ..self }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn role(&self) -> LotteryRole {
        self.role
    }

    pub fn manager(&self) -> Address {
        self.manager
    }

    pub fn prize_pool(&self) -> Wei {
        self.prize_pool
    }

    pub fn roster(&self) -> &ParticipantRoster {
        &self.roster
    }

    pub fn winner(&self) -> Option<&WinnerRecord> {
        self.winner.as_ref()
    }

    pub fn participant_count(&self) -> usize {
        self.roster.len()
    }
}

// ============================================================================
// Trigger
// ============================================================================

/// Reason to run a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
pub enum Trigger {
    /// User asked for a refresh.
    ManualRefresh,

    /// A participant entered, observed through a push event.
    EntryEvent {
        participant: Address,
        origin: Option<EventOrigin>,
    },

    /// A winner was selected, observed through a push event.
    WinnerEvent {
        record: WinnerRecord,
        origin: Option<EventOrigin>,
    },

    /// One of this client's own transactions was accepted.
    PostTxOptimistic { receipt: TxReceipt },
}

impl Trigger {
    pub fn label(&self) -> &'static str {
        self.into()
    }
}

impl From<LedgerEvent> for Trigger {
    fn from(event: LedgerEvent) -> Self {
        match event {
            LedgerEvent::ParticipantEntered { participant, origin } => Trigger::EntryEvent {
                participant,
                origin: Some(origin),
            },
            LedgerEvent::WinnerSelected { record, origin } => Trigger::WinnerEvent {
                record,
                origin: Some(origin),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[test]
    fn manager_role_is_case_insensitive_through_parsing() {
        let manager: Address = "0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD".parse().unwrap();
        let account: Address = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".parse().unwrap();

        assert_eq!(LotteryRole::for_account(manager, account), LotteryRole::Manager);
        assert_eq!(LotteryRole::for_account(manager, addr(1)), LotteryRole::Participant);
        assert_eq!(LotteryRole::for_account(manager, Address::ZERO), LotteryRole::Unset);
    }

    #[test]
    fn roster_rejects_sentinel_and_overflow() {
        let mut roster = ParticipantRoster::new();
        assert_eq!(roster.push(Address::ZERO), Err(RosterError::ZeroAddress));

        for byte in 1..=MAX_PARTICIPANTS as u8 {
            roster.push(addr(byte)).unwrap();
        }
        assert!(roster.is_full());
        assert_eq!(roster.push(addr(0xff)), Err(RosterError::Full));
        assert_eq!(roster.as_slice()[0], addr(1));
    }

    #[test]
    fn with_winner_keeps_reads_intact() {
        let roster = ParticipantRoster::from_addresses([addr(1), addr(2)]).unwrap();
        let snapshot = LotterySnapshot::new(addr(1), addr(9), Wei::from(5u64), roster.clone());
        let record = WinnerRecord {
            address: addr(2),
            amount: Wei::from(5u64),
        };

        let with_winner = snapshot.clone().with_winner(Some(record));

        assert_eq!(with_winner.roster(), &roster);
        assert_eq!(with_winner.role(), LotteryRole::Participant);
        assert_eq!(with_winner.winner(), Some(&record));
        assert_eq!(snapshot.winner(), None);
    }

    #[test]
    fn ledger_events_become_triggers_with_origin() {
        let origin = EventOrigin {
            transaction: crate::TransactionId([7; 32]),
            log_index: 0,
            block_number: 12,
        };
        let trigger = Trigger::from(LedgerEvent::ParticipantEntered {
            participant: addr(3),
            origin,
        });

        assert_eq!(
            trigger,
            Trigger::EntryEvent {
                participant: addr(3),
                origin: Some(origin),
            }
        );
        assert_eq!(trigger.label(), "EntryEvent");
    }
}
