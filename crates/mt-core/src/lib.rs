//! Core logic for the mower timer.
//!
//! This crate contains:
//! - Extraction: scanning raw log text for "next run" announcements
//! - Countdown: classifying the resolved target and rendering status text
//! - Resolution: owning the current target and re-reading the log when stale

pub mod countdown;
pub mod event;
pub mod extract;
pub mod resolver;
pub mod sink;
pub mod source;
pub mod types;

pub use countdown::{CountdownState, RUNNING_TEXT, ResolvedTarget, render};
pub use event::LogEvent;
pub use extract::{Extraction, ParseSkip, extract, extract_events};
pub use resolver::Resolver;
pub use sink::StatusSink;
pub use source::{FileLogSource, LogSource, SourceError};
pub use types::PatternKind;
