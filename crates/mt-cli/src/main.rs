use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use mt_core::{FileLogSource, Resolver};
use tracing_subscriber::EnvFilter;

use mt_cli::commands::{events, init, status, watch};
use mt_cli::{Cli, Commands, Config};

/// Load config and apply a command-line log file override.
fn load_config(config_path: Option<&Path>, log_file: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path)
        .context("failed to load configuration")?
        .with_log_file(log_file);
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so the status line on stdout stays intact
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout();

    match &cli.command {
        Some(Commands::Watch { log_file }) => {
            let config = load_config(cli.config.as_deref(), log_file.as_deref())?;
            watch::run(&config)?;
        }
        Some(Commands::Status { log_file }) => {
            let config = load_config(cli.config.as_deref(), log_file.as_deref())?;
            let resolver = Resolver::new(FileLogSource::new(&config.log_file_path));
            status::run(
                &mut stdout,
                &resolver,
                Local::now().naive_local(),
                config.remark.as_deref(),
            )?;
        }
        Some(Commands::Events { log_file, json }) => {
            let config = load_config(cli.config.as_deref(), log_file.as_deref())?;
            let resolver = Resolver::new(FileLogSource::new(&config.log_file_path));
            events::run(&mut stdout, &resolver, *json)?;
        }
        Some(Commands::Init { force }) => {
            // Init writes the config, so it must not require one to load
            init::run(&mut stdout, cli.config.as_deref(), *force)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
