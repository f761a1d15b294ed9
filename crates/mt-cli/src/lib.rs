//! Mower timer CLI library.
//!
//! This crate provides the terminal front end for the mower timer.

mod cli;
pub mod commands;
mod config;
pub mod monitor;
pub mod terminal;

pub use cli::{Cli, Commands};
pub use config::{Config, default_config_file};
