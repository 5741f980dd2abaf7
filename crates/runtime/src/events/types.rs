//! Event payloads and change tracking.

use bitflags::bitflags;
use client_blockchain_core::{Address, EventKind, LotterySnapshot, WinnerRecord};

bitflags! {
    /// Tracks which parts of a snapshot changed between two builds.
    ///
    /// Frontends use this to skip re-rendering unchanged sections.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SnapshotChanges: u8 {
        /// Account, manager, or the role derived from them.
        const ROLE   = 0b0001;

        /// Contract balance.
        const POOL   = 0b0010;

        /// Participant roster.
        const ROSTER = 0b0100;

        /// Last winner.
        const WINNER = 0b1000;

        const ALL = Self::ROLE.bits()
                  | Self::POOL.bits()
                  | Self::ROSTER.bits()
                  | Self::WINNER.bits();
    }
}

impl SnapshotChanges {
    /// Diff two snapshots. Everything changed when there was no previous one.
    pub fn between(previous: Option<&LotterySnapshot>, next: &LotterySnapshot) -> Self {
        let Some(previous) = previous else {
            return Self::ALL;
        };

        let mut changes = Self::empty();
        if previous.account() != next.account()
            || previous.manager() != next.manager()
            || previous.role() != next.role()
        {
            changes |= Self::ROLE;
        }
        if previous.prize_pool() != next.prize_pool() {
            changes |= Self::POOL;
        }
        if previous.roster() != next.roster() {
            changes |= Self::ROSTER;
        }
        if previous.winner() != next.winner() {
            changes |= Self::WINNER;
        }
        changes
    }
}

/// Notifications published by the engine and the event bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A new snapshot was published.
    SnapshotUpdated {
        changes: SnapshotChanges,
        /// Triggers merged into the build that produced it.
        triggers: usize,
    },

    /// A build failed; the previous snapshot stays published.
    RefreshFailed { message: String },

    /// A `participantsEntered` event was observed.
    ParticipantEntered { participant: Address },

    /// A `WinnerSelected` event was observed.
    WinnerSelected { record: WinnerRecord },

    /// A push subscription ended and will not be reopened.
    SubscriptionClosed { kind: EventKind },
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::{ParticipantRoster, ether};

    fn snapshot(pool: u64, roster: &[Address]) -> LotterySnapshot {
        LotterySnapshot::new(
            Address([1; 20]),
            Address([2; 20]),
            ether(pool),
            ParticipantRoster::from_addresses(roster.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn first_snapshot_changes_everything() {
        assert_eq!(
            SnapshotChanges::between(None, &snapshot(0, &[])),
            SnapshotChanges::ALL
        );
    }

    #[test]
    fn diff_reports_only_changed_sections() {
        let before = snapshot(1, &[Address([3; 20])]);
        let after = snapshot(2, &[Address([3; 20]), Address([4; 20])]);
        assert_eq!(
            SnapshotChanges::between(Some(&before), &after),
            SnapshotChanges::POOL | SnapshotChanges::ROSTER
        );

        let winner = WinnerRecord {
            address: Address([3; 20]),
            amount: ether(2),
        };
        let with_winner = after.clone().with_winner(Some(winner));
        assert_eq!(
            SnapshotChanges::between(Some(&after), &with_winner),
            SnapshotChanges::WINNER
        );
        assert!(SnapshotChanges::between(Some(&after), &after).is_empty());
    }
}
