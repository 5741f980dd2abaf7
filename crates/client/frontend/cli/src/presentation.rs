//! Plain-text rendering of views and notices.
use std::fmt::Write;

use client_blockchain_core::LotteryRole;
use client_frontend_core::{LotteryView, MessageEntry, MessageLevel};

pub fn render_view(view: &LotteryView) -> String {
    let mut out = String::new();

    let role = match view.role {
        LotteryRole::Manager => "manager",
        LotteryRole::Participant => "participant",
        LotteryRole::Unset => "not connected",
    };
    let _ = writeln!(out, "---- Lottery ----");
    let _ = writeln!(out, "account      {} ({role})", view.account);
    let _ = writeln!(out, "manager      {}", view.manager);
    let _ = writeln!(out, "prize pool   {}", view.prize_pool);
    let _ = writeln!(out, "participants {}", view.participant_count);
    for (index, participant) in view.participants.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {participant}", index + 1);
    }
    if let Some(winner) = &view.winner {
        let _ = writeln!(out, "last winner  {} ({})", winner.address, winner.amount);
    }

    let entry_marker = if view.entry.is_open() { "*" } else { "-" };
    let _ = writeln!(out, "[{entry_marker}] enter: {}", view.entry.label());
    if let Some(label) = view.select_winner.label() {
        let marker = if view.select_winner.is_ready() { "*" } else { "-" };
        let _ = writeln!(out, "[{marker}] select: {label}");
    }

    out
}

pub fn render_notice(entry: &MessageEntry) -> String {
    let tag = match entry.level {
        MessageLevel::Info => "info",
        MessageLevel::Success => " ok ",
        MessageLevel::Warning => "warn",
        MessageLevel::Error => "err ",
    };
    format!("[{tag}] {}\n", entry.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::{Address, LotterySnapshot, ParticipantRoster, ether};

    #[test]
    fn manager_view_lists_roster_and_selection_gate() {
        let manager = Address([0xaa; 20]);
        let roster = ParticipantRoster::from_addresses([Address([0x01; 20])]).unwrap();
        let snapshot = LotterySnapshot::new(manager, manager, ether(1), roster);

        let text = render_view(&LotteryView::from_snapshot(&snapshot));

        assert!(text.contains("(manager)"));
        assert!(text.contains("participants 1/10"));
        assert!(text.contains("1. 0x0101...0101"));
        assert!(text.contains("[-] enter: Managers Cannot Participate"));
        assert!(text.contains("[-] select: Select Winner (Need 2 more)"));
    }

    #[test]
    fn notices_carry_their_level() {
        let entry = MessageEntry::new("Lottery is full!", MessageLevel::Error);
        assert_eq!(render_notice(&entry), "[err ] Lottery is full!\n");
    }
}
