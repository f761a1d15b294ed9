//! Events command for listing every announcement in the log.
//!
//! Useful when the countdown looks wrong: shows each candidate the
//! extractor saw and which one won.

use std::io::Write;

use anyhow::{Context, Result};
use mt_core::{LogSource, Resolver};

/// Runs the events command, as a table or as JSONL.
pub fn run<W: Write, S: LogSource>(
    writer: &mut W,
    resolver: &Resolver<S>,
    json: bool,
) -> Result<()> {
    let scan = resolver.scan();
    let events = &scan.events;

    if json {
        for event in events {
            let line = serde_json::to_string(event).context("failed to serialize event")?;
            writeln!(writer, "{line}")?;
        }
        return Ok(());
    }

    if events.is_empty() {
        writeln!(writer, "No announcements found.")?;
        return Ok(());
    }

    let winner = scan.resolve();
    for event in events {
        let marker = if winner.is_some_and(|w| w.target_time == event.target_time) {
            "*"
        } else {
            " "
        };
        writeln!(
            writer,
            "{marker} {}  ->  {}  {}",
            event.source_timestamp, event.target_time, event.kind
        )?;
    }

    Ok(())
}
