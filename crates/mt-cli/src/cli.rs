//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Countdown to the mower's next run.
///
/// Reads the job's log file and shows how long until it resumes work.
#[derive(Debug, Parser)]
#[command(name = "mt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Keep a live countdown on the terminal until interrupted.
    Watch {
        /// Log file to read instead of the configured one.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Print the current countdown once.
    Status {
        /// Log file to read instead of the configured one.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// List every announcement found in the log.
    Events {
        /// Log file to read instead of the configured one.
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Output as JSON lines.
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}
