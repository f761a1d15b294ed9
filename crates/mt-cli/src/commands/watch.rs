//! Watch command: a live countdown on the terminal.

use anyhow::{Context, Result};
use mt_core::{FileLogSource, Resolver};
use tokio_util::sync::CancellationToken;

use crate::Config;
use crate::monitor::Monitor;
use crate::terminal::TerminalSink;

/// Runs the poller and renderer until Ctrl-C.
pub fn run(config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(watch(config))
}

async fn watch(config: &Config) -> Result<()> {
    let source = FileLogSource::new(&config.log_file_path);
    tracing::info!(log_file = %source.path().display(), "watching log");

    let monitor = Monitor::new(Resolver::new(source))
        .with_intervals(config.poll_interval(), config.render_interval());
    let sink = TerminalSink::new(std::io::stdout(), config.remark.clone());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        tracing::debug!("interrupt received, shutting down");
        on_signal.cancel();
    });

    let mut sink = monitor.run(sink, cancel).await?;
    sink.finish().context("failed to write to stdout")?;
    Ok(())
}
