//! Status line output on a terminal.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use mt_core::StatusSink;

/// Rewrites a single terminal line in place on every publish.
pub struct TerminalSink<W> {
    writer: W,
    remark: Option<String>,
    last: Option<String>,
}

impl<W: Write + Send> TerminalSink<W> {
    pub const fn new(writer: W, remark: Option<String>) -> Self {
        Self {
            writer,
            remark,
            last: None,
        }
    }

    /// Formats the line exactly as it is written, without control codes.
    pub fn line(&self, text: &str) -> String {
        match &self.remark {
            Some(remark) => format!("{remark}  {text}"),
            None => text.to_string(),
        }
    }

    /// Ends the status line so later output starts on a fresh line.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.last.is_some() {
            writeln!(self.writer)?;
            self.writer.flush()?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> StatusSink for TerminalSink<W> {
    fn publish(&mut self, text: &str) -> io::Result<()> {
        let line = self.line(text);
        if self.last.as_deref() != Some(text) {
            tracing::debug!(status = text, "status changed");
            self.last = Some(text.to_string());
        }
        queue!(
            self.writer,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        )?;
        self.writer.flush()
    }
}
