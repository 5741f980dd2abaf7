//! Utilities for reacting to sync events inside UI layers.
use runtime::SyncEvent;

use crate::format::{format_ether, short_address};
use crate::message::{MessageLevel, MessageLog};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &SyncEvent) -> EventImpact;
    fn message_log(&self) -> &MessageLog;
    fn message_log_mut(&mut self) -> &mut MessageLog;
}

/// Turns sync events into notices.
#[derive(Clone, Debug)]
pub struct NoticeConsumer {
    log: MessageLog,
}

impl NoticeConsumer {
    pub fn new(log: MessageLog) -> Self {
        Self { log }
    }
}

impl EventConsumer for NoticeConsumer {
    fn on_event(&mut self, event: &SyncEvent) -> EventImpact {
        match event {
            SyncEvent::SnapshotUpdated { .. } => EventImpact::redraw(),
            SyncEvent::RefreshFailed { .. } => {
                self.log
                    .push_text("Error loading lottery data", MessageLevel::Error);
                EventImpact::none()
            }
            SyncEvent::ParticipantEntered { .. } => {
                self.log
                    .push_text("New participant entered!", MessageLevel::Info);
                EventImpact::none()
            }
            SyncEvent::WinnerSelected { record } => {
                self.log.push_text(
                    format!(
                        "Winner selected! {} won {}",
                        short_address(&record.address),
                        format_ether(record.amount)
                    ),
                    MessageLevel::Success,
                );
                EventImpact::none()
            }
            SyncEvent::SubscriptionClosed { kind } => {
                self.log.push_text(
                    format!("Live {kind} updates stopped; use refresh to see changes"),
                    MessageLevel::Warning,
                );
                EventImpact::none()
            }
        }
    }

    fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }
}
