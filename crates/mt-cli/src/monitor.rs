//! Background polling and rendering.
//!
//! [`Monitor`] drives two independent loops over one shared [`Resolver`]:
//! - the poller re-reads the log on a slow cadence, and only when the target
//!   is unknown or has elapsed;
//! - the renderer publishes the status line every tick from the in-memory
//!   target, re-resolving immediately when it finds the target due.
//!
//! Log reads happen on blocking worker threads so a large file never stalls
//! the timers. Both loops stop when the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use mt_core::{LogSource, Resolver, StatusSink};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the poller and renderer for one log.
pub struct Monitor<S> {
    resolver: Arc<Resolver<S>>,
    poll_interval: Duration,
    render_interval: Duration,
}

impl<S: LogSource + 'static> Monitor<S> {
    /// Creates a monitor with the default cadences (5 s poll, 1 s render).
    pub fn new(resolver: Resolver<S>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            poll_interval: Duration::from_secs(5),
            render_interval: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn with_intervals(mut self, poll: Duration, render: Duration) -> Self {
        self.poll_interval = poll;
        self.render_interval = render;
        self
    }

    pub fn resolver(&self) -> Arc<Resolver<S>> {
        Arc::clone(&self.resolver)
    }

    /// Runs both loops until `cancel` fires, then hands the sink back.
    pub async fn run<K: StatusSink + 'static>(
        self,
        sink: K,
        cancel: CancellationToken,
    ) -> Result<K> {
        info!(
            poll_secs = self.poll_interval.as_secs_f64(),
            render_secs = self.render_interval.as_secs_f64(),
            "monitor started"
        );

        let poller = tokio::spawn(poll_loop(
            Arc::clone(&self.resolver),
            self.poll_interval,
            cancel.clone(),
        ));
        let renderer = tokio::spawn(render_loop(
            Arc::clone(&self.resolver),
            self.render_interval,
            sink,
            cancel,
        ));

        let (poller, renderer) = tokio::join!(poller, renderer);
        poller.context("poller task failed")?;
        let sink = renderer.context("renderer task failed")?;

        info!("monitor stopped");
        Ok(sink)
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

async fn poll_loop<S: LogSource + 'static>(
    resolver: Arc<Resolver<S>>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("poller cancelled");
                break;
            }
            _ = ticker.tick() => {
                let resolver = Arc::clone(&resolver);
                let refresh =
                    tokio::task::spawn_blocking(move || resolver.refresh_if_stale(local_now()));
                if let Err(e) = refresh.await {
                    warn!(error = %e, "log refresh failed");
                }
            }
        }
    }
}

async fn render_loop<S: LogSource + 'static, K: StatusSink>(
    resolver: Arc<Resolver<S>>,
    every: Duration,
    mut sink: K,
    cancel: CancellationToken,
) -> K {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("renderer cancelled");
                break;
            }
            _ = ticker.tick() => {
                let now = local_now();
                let state = resolver.state(now);

                if let Err(e) = sink.publish(&state.render()) {
                    warn!(error = %e, "status output closed, stopping");
                    cancel.cancel();
                    break;
                }

                if state.needs_refresh() {
                    let resolver = Arc::clone(&resolver);
                    let refresh =
                        tokio::task::spawn_blocking(move || resolver.refresh_if_stale(now));
                    if let Err(e) = refresh.await {
                        warn!(error = %e, "log refresh failed");
                    }
                }
            }
        }
    }

    sink
}

#[cfg(test)]
mod tests {
    use std::io;

    use chrono::TimeDelta;
    use mt_core::FileLogSource;

    use super::*;

    const FAST: Duration = Duration::from_millis(10);

    /// Keeps every published line.
    #[derive(Default)]
    struct Recorded(Vec<String>);

    impl StatusSink for Recorded {
        fn publish(&mut self, text: &str) -> io::Result<()> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    struct ClosedSink;

    impl StatusSink for ClosedSink {
        fn publish(&mut self, _text: &str) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    fn wait_line(at: NaiveDateTime, seconds: u32) -> String {
        format!(
            "{},000 worker: 等待跑单 {seconds} 秒\n",
            at.format("%Y-%m-%d %H:%M:%S")
        )
    }

    #[tokio::test]
    async fn test_missing_log_renders_running_until_cancelled() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(FileLogSource::new(temp.path().join("runtime.log")));
        let monitor = Monitor::new(resolver).with_intervals(FAST, FAST);
        let cancel = CancellationToken::new();

        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stopper.cancel();
        });

        let Recorded(published) = monitor.run(Recorded::default(), cancel).await.unwrap();
        assert!(!published.is_empty());
        assert!(published.iter().all(|text| text == "running…"));
    }

    #[tokio::test]
    async fn test_announcement_is_picked_up() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("runtime.log");
        std::fs::write(&path, wait_line(local_now(), 3600)).unwrap();

        let monitor =
            Monitor::new(Resolver::new(FileLogSource::new(&path))).with_intervals(FAST, FAST);
        let resolver = monitor.resolver();
        let cancel = CancellationToken::new();

        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            stopper.cancel();
        });

        let Recorded(published) = monitor.run(Recorded::default(), cancel).await.unwrap();
        let target = resolver.snapshot().unwrap();
        assert!(target.dispatching);
        assert!(target.target_time > local_now() + TimeDelta::minutes(50));
        assert!(published.iter().any(|text| {
            text.starts_with("dispatching order… ") && text.ends_with(" seconds remaining")
        }));
    }

    #[tokio::test]
    async fn test_slow_poll_still_renders_countdown() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("runtime.log");
        std::fs::write(&path, wait_line(local_now(), 600)).unwrap();

        let monitor = Monitor::new(Resolver::new(FileLogSource::new(&path)))
            .with_intervals(Duration::from_secs(3600), FAST);
        let resolver = monitor.resolver();
        let cancel = CancellationToken::new();

        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            stopper.cancel();
        });

        let Recorded(published) = monitor.run(Recorded::default(), cancel).await.unwrap();
        assert!(resolver.snapshot().is_some());
        assert!(published.iter().any(|text| text.starts_with("dispatching order… ")));
    }

    #[tokio::test]
    async fn test_closed_sink_stops_monitor() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(FileLogSource::new(temp.path().join("runtime.log")));
        let monitor = Monitor::new(resolver).with_intervals(FAST, FAST);
        let cancel = CancellationToken::new();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            monitor.run(ClosedSink, cancel.clone()),
        )
        .await;

        assert!(result.is_ok(), "monitor should stop on its own");
        assert!(cancel.is_cancelled());
    }
}
