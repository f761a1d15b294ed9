//! Where log text comes from.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The log could not be read this pass.
///
/// Callers treat this as "nothing extracted" and retry on the next poll.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The log file does not exist (yet).
    #[error("log file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The log file exists but could not be read.
    #[error("failed to read log file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Supplies the full current text of the log.
pub trait LogSource: Send + Sync {
    /// Reads the whole log.
    fn read(&self) -> Result<String, SourceError>;
}

/// A log file on disk, re-read in full on every call.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for FileLogSource {
    fn read(&self) -> Result<String, SourceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(SourceError::Unreadable {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        // A stray invalid byte should not hide every announcement in the file.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
