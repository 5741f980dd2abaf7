//! Mapping of raw contract rejections to user-facing messages.
//!
//! Remote revert text is matched case-insensitively against the reasons the
//! contract is known to produce. Anything unrecognized is shown verbatim.

use std::fmt;

/// Submission the user attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum LotteryAction {
    #[strum(to_string = "entering lottery")]
    Enter,
    #[strum(to_string = "selecting winner")]
    SelectWinner,
}

impl LotteryAction {
    /// Notice shown when the submission was accepted.
    pub fn success_message(&self) -> &'static str {
        match self {
            LotteryAction::Enter => "Successfully entered the lottery!",
            LotteryAction::SelectWinner => "Winner selected successfully!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    ManagerCannotParticipate,
    LotteryFull,
    NotAuthorized,
    InsufficientParticipants,
    Other(String),
}

impl Rejection {
    pub fn message(&self) -> &str {
        match self {
            Rejection::ManagerCannotParticipate => "Managers cannot participate!",
            Rejection::LotteryFull => "Lottery is full!",
            Rejection::NotAuthorized => "Only the manager can select a winner!",
            Rejection::InsufficientParticipants => "Need at least 3 participants!",
            Rejection::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classify the raw failure text of `action`.
pub fn classify_rejection(action: LotteryAction, raw: &str) -> Rejection {
    let text = raw.to_lowercase();
    let mentions = |needle: &str| text.contains(&needle.to_lowercase());

    match action {
        LotteryAction::Enter if mentions("Manager cant Participate") => {
            Rejection::ManagerCannotParticipate
        }
        LotteryAction::Enter if mentions("No more people can participate") => {
            Rejection::LotteryFull
        }
        LotteryAction::SelectWinner if mentions("Not Authorized") => Rejection::NotAuthorized,
        LotteryAction::SelectWinner
            if mentions("require") || mentions("insufficient participants") =>
        {
            Rejection::InsufficientParticipants
        }
        _ => Rejection::Other(raw.to_string()),
    }
}

/// Full notice for a failed submission, e.g.
/// `Error entering lottery: Managers cannot participate!`.
pub fn failure_notice(action: LotteryAction, raw: &str) -> String {
    format!("Error {action}: {}", classify_rejection(action, raw))
}
