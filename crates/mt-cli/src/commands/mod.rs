//! CLI subcommand implementations.

pub mod events;
pub mod init;
pub mod status;
pub mod watch;
