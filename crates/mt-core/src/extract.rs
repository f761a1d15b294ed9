//! Timestamp extraction from raw log text.
//!
//! Three pattern families are scanned independently over the whole text:
//! 1. Duration wait - `等待跑单 <seconds> 秒`, target is the line timestamp plus the seconds
//! 2. Rest with hours - `休息 <H> 小时 <M> 分钟，到<HH:MM:SS>开始工作`
//! 3. Rest in minutes - `休息 <M> 分钟，到<HH:MM:SS>开始工作`
//!
//! Rest announcements combine the announced clock time with the *date of the
//! log line*. A resume time that wraps past midnight therefore lands earlier
//! on the same date; this is kept as-is so countdowns match what the job
//! itself logged.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use regex::{Captures, Regex};
use thiserror::Error;

use crate::countdown::ResolvedTarget;
use crate::event::LogEvent;
use crate::types::PatternKind;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Duration-wait targets come from float arithmetic, so they are matched
/// against the resolved target with this tolerance.
const DURATION_WAIT_TOLERANCE_MS: i64 = 1_000;

static DURATION_WAIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}),\d+ .*?: 等待跑单 (\d+\.?\d*) 秒").unwrap()
});

static REST_HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}),\d+ .*?: 休息 \d+ 小时 \d+ 分钟，到(\d{2}:\d{2}:\d{2})开始工作",
    )
    .unwrap()
});

static REST_MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}),\d+ .*?: 休息 \d+ 分钟，到(\d{2}:\d{2}:\d{2})开始工作",
    )
    .unwrap()
});

/// Why a matched line did not produce an event.
///
/// Skips are never fatal: the candidate is dropped and the scan continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseSkip {
    /// The leading timestamp is not a real calendar time.
    #[error("invalid line timestamp: {value}")]
    InvalidTimestamp { value: String },

    /// The wait duration could not be parsed or is out of range.
    #[error("invalid wait duration: {value}")]
    InvalidSeconds { value: String },

    /// The announced resume time is not a valid time of day.
    #[error("invalid resume time: {value}")]
    InvalidClockTime { value: String },

    /// The computed target does not fit in the calendar.
    #[error("target time out of range for line timestamp {value}")]
    OutOfRange { value: String },
}

impl PatternKind {
    fn regex(self) -> &'static Regex {
        match self {
            Self::DurationWait => &DURATION_WAIT_RE,
            Self::ScheduledResume { with_hours: true } => &REST_HOURS_RE,
            Self::ScheduledResume { with_hours: false } => &REST_MINUTES_RE,
        }
    }

    fn parse(self, caps: &Captures<'_>) -> Result<LogEvent, ParseSkip> {
        match self {
            Self::DurationWait => parse_duration_wait(caps),
            Self::ScheduledResume { .. } => parse_scheduled_resume(caps, self),
        }
    }
}

/// The outcome of one scan over the log text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Every announcement that parsed, grouped by family in
    /// [`PatternKind::ALL`] order and by appearance within a family.
    pub events: Vec<LogEvent>,
    /// The last duration-wait line in the text, if it parsed. A final wait
    /// line that fails to parse leaves this empty even when earlier ones
    /// were valid.
    pub latest_wait: Option<LogEvent>,
}

impl Extraction {
    /// Reduces the scan to the single authoritative target.
    ///
    /// The furthest-future target wins regardless of where it appears in the
    /// log. The duration-wait phrasing applies when the latest duration-wait
    /// line lands within one second of that target.
    pub fn resolve(&self) -> Option<ResolvedTarget> {
        let winner = self.events.iter().max_by_key(|e| e.target_time)?;

        let dispatching = self.latest_wait.is_some_and(|wait| {
            (wait.target_time - winner.target_time)
                .abs()
                .num_milliseconds()
                < DURATION_WAIT_TOLERANCE_MS
        });

        Some(ResolvedTarget {
            target_time: winner.target_time,
            kind: winner.kind,
            dispatching,
        })
    }
}

/// Scans `text` with every pattern family.
///
/// Each family scans the full text on its own. Candidates that fail to
/// parse are skipped.
pub fn extract(text: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for kind in PatternKind::ALL {
        for caps in kind.regex().captures_iter(text) {
            let parsed = kind.parse(&caps);
            if kind.is_duration_wait() {
                extraction.latest_wait = parsed.as_ref().ok().copied();
            }
            match parsed {
                Ok(event) => extraction.events.push(event),
                Err(skip) => tracing::debug!(%kind, %skip, "skipping log candidate"),
            }
        }
    }

    extraction
}

/// Extracts every announcement found in `text`.
pub fn extract_events(text: &str) -> Vec<LogEvent> {
    extract(text).events
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ParseSkip> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        ParseSkip::InvalidTimestamp {
            value: value.to_string(),
        }
    })
}

fn parse_duration_wait(caps: &Captures<'_>) -> Result<LogEvent, ParseSkip> {
    let source_timestamp = parse_timestamp(&caps[1])?;

    let invalid_seconds = || ParseSkip::InvalidSeconds {
        value: caps[2].to_string(),
    };
    let seconds: f64 = caps[2].parse().map_err(|_| invalid_seconds())?;
    let wait = Duration::try_from_secs_f64(seconds).map_err(|_| invalid_seconds())?;
    let wait = TimeDelta::from_std(wait).map_err(|_| invalid_seconds())?;

    let target_time = source_timestamp
        .checked_add_signed(wait)
        .ok_or_else(|| ParseSkip::OutOfRange {
            value: caps[1].to_string(),
        })?;

    Ok(LogEvent {
        source_timestamp,
        target_time,
        kind: PatternKind::DurationWait,
    })
}

fn parse_scheduled_resume(caps: &Captures<'_>, kind: PatternKind) -> Result<LogEvent, ParseSkip> {
    let source_timestamp = parse_timestamp(&caps[1])?;
    let resume_at = NaiveTime::parse_from_str(&caps[2], CLOCK_FORMAT).map_err(|_| {
        ParseSkip::InvalidClockTime {
            value: caps[2].to_string(),
        }
    })?;

    Ok(LogEvent {
        source_timestamp,
        target_time: source_timestamp.date().and_time(resume_at),
        kind,
    })
}
