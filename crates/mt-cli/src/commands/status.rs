//! Status command for printing the current countdown once.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use mt_core::{LogSource, Resolver};

/// Resolves the log once and prints the status line as seen at `now`.
pub fn run<W: Write, S: LogSource>(
    writer: &mut W,
    resolver: &Resolver<S>,
    now: NaiveDateTime,
    remark: Option<&str>,
) -> Result<()> {
    resolver.resolve();
    let text = resolver.state(now).render();

    match remark {
        Some(remark) => writeln!(writer, "{remark}  {text}")?,
        None => writeln!(writer, "{text}")?,
    }

    Ok(())
}
