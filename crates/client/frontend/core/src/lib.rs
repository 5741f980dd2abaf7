//! Cross-frontend primitives for presenting the lottery.
//!
//! Houses the notice log, sync-event handling, rejection classification, and
//! view-model types that the terminal client and any future graphical client
//! can reuse.
pub mod config;
pub mod event;
pub mod format;
pub mod frontend;
pub mod message;
pub mod rejection;
pub mod view_model;

pub use config::{FrontendConfig, MessageConfig};
pub use event::{EventConsumer, EventImpact, NoticeConsumer};
pub use format::{format_ether, short_address};
pub use frontend::Frontend;
pub use message::{MessageEntry, MessageLevel, MessageLog};
pub use rejection::{LotteryAction, Rejection, classify_rejection, failure_notice};
pub use view_model::{EntryGate, LotteryView, SelectWinnerGate, WinnerView};
