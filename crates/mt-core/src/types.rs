//! Core type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The pattern family a log announcement was matched by.
///
/// Each family carries its own line shape and its own way of turning the
/// matched text into a target time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternKind {
    /// An explicit countdown in seconds, relative to the line's timestamp.
    DurationWait,
    /// An absolute time-of-day at which the job resumes.
    ScheduledResume {
        /// Whether the announcement spelled out an hour component.
        with_hours: bool,
    },
}

impl PatternKind {
    /// Every pattern family, in scan order.
    pub const ALL: [Self; 3] = [
        Self::DurationWait,
        Self::ScheduledResume { with_hours: true },
        Self::ScheduledResume { with_hours: false },
    ];

    /// Short label used in logs and command output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DurationWait => "duration_wait",
            Self::ScheduledResume { with_hours: true } => "scheduled_resume_hours",
            Self::ScheduledResume { with_hours: false } => "scheduled_resume_minutes",
        }
    }

    /// Returns `true` for the duration-wait family.
    pub const fn is_duration_wait(&self) -> bool {
        matches!(self, Self::DurationWait)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
