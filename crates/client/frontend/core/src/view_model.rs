//! Presentation-ready view of a [`LotterySnapshot`].
//!
//! Gating mirrors the contract rules so the UI can disable actions that would
//! certainly be rejected. The contract stays the authority: an enabled action
//! may still fail and is then reported through [`crate::classify_rejection`].

use client_blockchain_core::{
    LotteryRole, LotterySnapshot, MAX_PARTICIPANTS, MIN_PARTICIPANTS_FOR_DRAW, WinnerRecord,
};

use crate::format::{format_ether, short_address};

/// Whether the connected account may enter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryGate {
    Open,
    ManagerCannotParticipate,
    LotteryFull,
}

impl EntryGate {
    pub fn for_snapshot(snapshot: &LotterySnapshot) -> Self {
        if snapshot.role().is_manager() {
            EntryGate::ManagerCannotParticipate
        } else if snapshot.participant_count() >= MAX_PARTICIPANTS {
            EntryGate::LotteryFull
        } else {
            EntryGate::Open
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EntryGate::Open)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryGate::Open => "Enter Lottery (1 ETH)",
            EntryGate::ManagerCannotParticipate => "Managers Cannot Participate",
            EntryGate::LotteryFull => "Lottery Full",
        }
    }
}

/// Whether winner selection is offered, and if so whether it is ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectWinnerGate {
    /// Not the manager.
    Hidden,
    /// Manager, but this many more participants are required.
    NeedMore(usize),
    Ready,
}

impl SelectWinnerGate {
    pub fn for_snapshot(snapshot: &LotterySnapshot) -> Self {
        if !snapshot.role().is_manager() {
            return SelectWinnerGate::Hidden;
        }

        let count = snapshot.participant_count();
        if count < MIN_PARTICIPANTS_FOR_DRAW {
            SelectWinnerGate::NeedMore(MIN_PARTICIPANTS_FOR_DRAW - count)
        } else {
            SelectWinnerGate::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SelectWinnerGate::Ready)
    }

    pub fn label(&self) -> Option<String> {
        match self {
            SelectWinnerGate::Hidden => None,
            SelectWinnerGate::NeedMore(more) => Some(format!("Select Winner (Need {more} more)")),
            SelectWinnerGate::Ready => Some("Select Winner".to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinnerView {
    pub address: String,
    pub amount: String,
}

impl From<&WinnerRecord> for WinnerView {
    fn from(record: &WinnerRecord) -> Self {
        Self {
            address: short_address(&record.address),
            amount: format_ether(record.amount),
        }
    }
}

/// Everything a frontend renders for one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LotteryView {
    pub account: String,
    pub role: LotteryRole,
    pub manager: String,
    pub prize_pool: String,
    /// `count/MAX_PARTICIPANTS`
    pub participant_count: String,
    pub participants: Vec<String>,
    pub winner: Option<WinnerView>,
    pub entry: EntryGate,
    pub select_winner: SelectWinnerGate,
}

impl LotteryView {
    pub fn from_snapshot(snapshot: &LotterySnapshot) -> Self {
        Self {
            account: short_address(&snapshot.account()),
            role: snapshot.role(),
            manager: short_address(&snapshot.manager()),
            prize_pool: format_ether(snapshot.prize_pool()),
            participant_count: format!("{}/{}", snapshot.participant_count(), MAX_PARTICIPANTS),
            participants: snapshot.roster().iter().map(short_address).collect(),
            winner: snapshot.winner().map(WinnerView::from),
            entry: EntryGate::for_snapshot(snapshot),
            select_winner: SelectWinnerGate::for_snapshot(snapshot),
        }
    }
}
