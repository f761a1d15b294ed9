//! Announcements extracted from the job's log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::PatternKind;

/// A single "next run" announcement matched in the log.
///
/// Events are rebuilt from scratch on every extraction pass and never
/// mutated afterwards. Times are naive local times since the log carries
/// no zone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// The timestamp leading the matched log line.
    pub source_timestamp: NaiveDateTime,
    /// When the job is expected to resume.
    pub target_time: NaiveDateTime,
    /// The pattern family that produced this event.
    pub kind: PatternKind,
}
