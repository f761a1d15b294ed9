//! The presentation seam.

use std::io;

/// Receives the status line on every render tick.
pub trait StatusSink: Send {
    /// Publishes `text`. An error means the surface is gone and rendering
    /// should stop.
    fn publish(&mut self, text: &str) -> io::Result<()>;
}
