//! Countdown state and display text.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::types::PatternKind;

/// Shown while the job is running or no announcement is known.
pub const RUNNING_TEXT: &str = "running…";

const SECONDS_PER_DAY: i64 = 86_400;

/// The authoritative next target, reduced from one extraction pass.
///
/// Replaced as a whole on every re-resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// When the job is expected to resume.
    pub target_time: NaiveDateTime,
    /// Pattern family of the winning announcement.
    pub kind: PatternKind,
    /// Whether the latest order-dispatch wait accounts for this target.
    pub dispatching: bool,
}

/// Where the countdown stands relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// No target has been resolved.
    Unknown,
    /// Waiting for a scheduled resume.
    Pending { remaining: TimeDelta },
    /// Waiting out an order-dispatch countdown.
    WaitingDuration { remaining: TimeDelta },
    /// The target has been reached and must be re-resolved.
    Due,
}

impl CountdownState {
    /// Classifies `target` against `now`.
    ///
    /// A target exactly equal to `now` is already due.
    pub fn evaluate(target: Option<&ResolvedTarget>, now: NaiveDateTime) -> Self {
        let Some(target) = target else {
            return Self::Unknown;
        };

        if target.target_time <= now {
            return Self::Due;
        }

        let remaining = target.target_time - now;
        if target.dispatching {
            Self::WaitingDuration { remaining }
        } else {
            Self::Pending { remaining }
        }
    }

    /// Whether the log should be re-read before trusting this state.
    pub const fn needs_refresh(&self) -> bool {
        matches!(self, Self::Unknown | Self::Due)
    }

    /// Renders the status line for this state.
    pub fn render(&self) -> String {
        match self {
            Self::Unknown | Self::Due => RUNNING_TEXT.to_string(),
            Self::WaitingDuration { remaining } => {
                format!(
                    "dispatching order… {} seconds remaining",
                    remaining.num_seconds()
                )
            }
            Self::Pending { remaining } => format_until_resume(*remaining),
        }
    }
}

/// Renders the display text for `target` as seen at `now`.
pub fn render(target: Option<&ResolvedTarget>, now: NaiveDateTime) -> String {
    CountdownState::evaluate(target, now).render()
}

fn format_until_resume(remaining: TimeDelta) -> String {
    // Sub-second remainder is dropped, matching a whole-second countdown.
    let total = remaining.num_seconds();
    let days = total / SECONDS_PER_DAY;
    let rest = total % SECONDS_PER_DAY;
    let (hours, minutes, seconds) = (rest / 3600, (rest % 3600) / 60, rest % 60);

    match days {
        0 => format!("{hours:02}:{minutes:02}:{seconds:02} until resume"),
        1 => format!("1 day {hours:02}:{minutes:02}:{seconds:02} until resume"),
        _ => format!("{days} days {hours:02}:{minutes:02}:{seconds:02} until resume"),
    }
}
