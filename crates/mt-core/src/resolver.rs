//! The countdown resolver.
//!
//! Holds the authoritative [`ResolvedTarget`] in a `watch` cell. Any number
//! of readers take cheap snapshots; re-resolution replaces the whole value,
//! so a reader never observes a partial update.
//!
//! Resolutions are serialised: the read, the scan and the swap happen under
//! one lock, so a slower pass over an older read can never overwrite the
//! result of a newer one.

use std::sync::{Mutex, PoisonError};

use chrono::NaiveDateTime;
use tokio::sync::watch;

use crate::countdown::{CountdownState, ResolvedTarget};
use crate::event::LogEvent;
use crate::extract::{Extraction, extract};
use crate::source::{LogSource, SourceError};

/// Owns the current target and decides when to consult the log again.
pub struct Resolver<S> {
    source: S,
    target: watch::Sender<Option<ResolvedTarget>>,
    resolving: Mutex<()>,
}

impl<S: LogSource> Resolver<S> {
    /// Creates a resolver with no target resolved yet.
    pub fn new(source: S) -> Self {
        let (target, _) = watch::channel(None);
        Self {
            source,
            target,
            resolving: Mutex::new(()),
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns a copy of the current target.
    pub fn snapshot(&self) -> Option<ResolvedTarget> {
        *self.target.borrow()
    }

    /// Classifies the current target against `now` without touching the log.
    pub fn state(&self, now: NaiveDateTime) -> CountdownState {
        CountdownState::evaluate(self.snapshot().as_ref(), now)
    }

    /// Reads and scans the log. An unavailable log yields an empty scan.
    pub fn scan(&self) -> Extraction {
        match self.source.read() {
            Ok(text) => extract(&text),
            Err(err @ SourceError::NotFound { .. }) => {
                tracing::debug!(%err, "log unavailable, nothing extracted");
                Extraction::default()
            }
            Err(err) => {
                tracing::warn!(%err, "log unavailable, nothing extracted");
                Extraction::default()
            }
        }
    }

    /// Reads and scans the log, keeping only the parsed announcements.
    pub fn events(&self) -> Vec<LogEvent> {
        self.scan().events
    }

    /// Re-reads the log and replaces the current target.
    pub fn resolve(&self) -> Option<ResolvedTarget> {
        let _guard = self
            .resolving
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let next = self.scan().resolve();

        self.target.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            match &next {
                Some(target) => tracing::info!(
                    target_time = %target.target_time,
                    kind = %target.kind,
                    dispatching = target.dispatching,
                    "resolved next run"
                ),
                None => tracing::info!("no next run announced"),
            }
            *current = next;
            true
        });

        next
    }

    /// Re-resolves only when the target is unknown or has elapsed.
    ///
    /// Returns whether the log was read.
    pub fn refresh_if_stale(&self, now: NaiveDateTime) -> bool {
        let state = self.state(now);
        if !state.needs_refresh() {
            return false;
        }
        tracing::debug!(?state, "target stale, re-reading log");
        self.resolve();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use chrono::TimeDelta;

    use super::*;
    use crate::source::FileLogSource;
    use crate::types::PatternKind;

    /// In-memory log that counts reads.
    #[derive(Default)]
    struct MemoryLog {
        text: Mutex<String>,
        reads: AtomicUsize,
    }

    impl MemoryLog {
        fn with(text: &str) -> Self {
            Self {
                text: Mutex::new(text.to_string()),
                reads: AtomicUsize::new(0),
            }
        }

        fn append(&self, line: &str) {
            let mut text = self.text.lock().unwrap();
            text.push_str(line);
            text.push('\n');
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl LogSource for MemoryLog {
        fn read(&self) -> Result<String, SourceError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.lock().unwrap().clone())
        }
    }

    /// Log that gains a longer wait on every read, and stalls early reads so
    /// they finish after later ones when nothing serialises them.
    #[derive(Default)]
    struct GrowingLog {
        text: Mutex<String>,
        reads: AtomicUsize,
    }

    impl LogSource for GrowingLog {
        fn read(&self) -> Result<String, SourceError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            let snapshot = {
                let mut text = self.text.lock().unwrap();
                text.push_str(&format!(
                    "2024-01-01 10:00:00,000 worker: 等待跑单 {} 秒\n",
                    (n + 1) * 60
                ));
                text.clone()
            };
            let stall = u32::try_from(8_usize.saturating_sub(n)).unwrap();
            thread::sleep(std::time::Duration::from_millis(5) * stall);
            Ok(snapshot)
        }
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    /// What the status line shows for `now` from the current target.
    fn shown<S: LogSource>(resolver: &Resolver<S>, now: NaiveDateTime) -> String {
        resolver.state(now).render()
    }

    #[test]
    fn test_starts_unknown() {
        let resolver = Resolver::new(MemoryLog::default());
        assert_eq!(resolver.snapshot(), None);
        assert_eq!(
            resolver.state(dt("2024-01-01 10:00:00")),
            CountdownState::Unknown
        );
    }

    #[test]
    fn test_missing_file_stays_unknown() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(FileLogSource::new(temp.path().join("runtime.log")));
        let now = dt("2024-01-01 10:00:00");

        assert!(resolver.events().is_empty());
        assert_eq!(resolver.scan(), Extraction::default());
        assert_eq!(resolver.resolve(), None);
        assert_eq!(resolver.state(now), CountdownState::Unknown);
        assert_eq!(shown(&resolver, now), "running…");
    }

    #[test]
    fn test_duration_wait_scenario() {
        let log = MemoryLog::with("2024-01-01 10:00:00,123 worker: 等待跑单 90 秒\n");
        let resolver = Resolver::new(log);

        resolver.resolve();
        assert_eq!(
            shown(&resolver, dt("2024-01-01 10:00:30")),
            "dispatching order… 60 seconds remaining"
        );
    }

    #[test]
    fn test_rest_scenario() {
        let log =
            MemoryLog::with("2024-01-01 10:00:00,000 worker: 休息 1 小时 4 分钟，到16:47:18开始工作\n");
        let resolver = Resolver::new(log);

        let target = resolver.resolve().unwrap();
        assert_eq!(target.target_time, dt("2024-01-01 16:47:18"));
        assert_eq!(target.kind, PatternKind::ScheduledResume { with_hours: true });
        assert_eq!(
            shown(&resolver, dt("2024-01-01 10:00:00")),
            "06:47:18 until resume"
        );
    }

    #[test]
    fn test_interleaved_max_wins() {
        let log = MemoryLog::with(
            "2024-01-01 10:04:00,000 worker: 等待跑单 60 秒\n\
             2024-01-01 10:00:00,000 worker: 休息 10 分钟，到10:10:00开始工作\n",
        );
        let resolver = Resolver::new(log);

        let target = resolver.resolve().unwrap();
        assert_eq!(target.target_time, dt("2024-01-01 10:10:00"));
        assert_eq!(
            shown(&resolver, dt("2024-01-01 10:00:00")),
            "00:10:00 until resume"
        );
    }

    #[test]
    fn test_refresh_skipped_while_pending() {
        let log = MemoryLog::with("2024-01-01 10:00:00,000 worker: 等待跑单 60 秒\n");
        let resolver = Resolver::new(log);
        let now = dt("2024-01-01 10:00:10");

        assert!(resolver.refresh_if_stale(now));
        assert_eq!(resolver.source().reads(), 1);

        for tick in 0..5 {
            let at = now + TimeDelta::seconds(tick);
            assert!(!resolver.refresh_if_stale(at));
            shown(&resolver, at);
        }
        assert_eq!(resolver.source().reads(), 1);
    }

    #[test]
    fn test_due_target_is_re_resolved() {
        let log = MemoryLog::with("2024-01-01 10:00:00,000 worker: 等待跑单 60 秒\n");
        let resolver = Resolver::new(log);
        resolver.resolve();

        resolver
            .source()
            .append("2024-01-01 10:01:00,000 worker: 休息 5 分钟，到10:06:00开始工作");

        let due = dt("2024-01-01 10:01:00");
        assert_eq!(resolver.state(due), CountdownState::Due);
        assert_eq!(shown(&resolver, due), "running…");
        assert!(resolver.refresh_if_stale(due));
        assert_eq!(resolver.source().reads(), 2);

        assert_eq!(
            resolver.snapshot().map(|t| t.target_time),
            Some(dt("2024-01-01 10:06:00"))
        );
        assert_eq!(shown(&resolver, due), "00:05:00 until resume");
    }

    #[test]
    fn test_unknown_target_attempts_resolution() {
        let resolver = Resolver::new(MemoryLog::default());
        let now = dt("2024-01-01 10:00:00");

        assert!(resolver.refresh_if_stale(now));
        assert_eq!(resolver.source().reads(), 1);
        assert_eq!(shown(&resolver, now), "running…");

        resolver
            .source()
            .append("2024-01-01 10:00:00,000 worker: 等待跑单 30 秒");
        assert!(resolver.refresh_if_stale(now));
        assert_eq!(
            shown(&resolver, now),
            "dispatching order… 30 seconds remaining"
        );
    }

    #[test]
    fn test_concurrent_resolves_keep_newest_target() {
        let resolver = Arc::new(Resolver::new(GrowingLog::default()));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || resolver.resolve())
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        // Eight reads appended waits of 60..=480 seconds; the last swap must
        // reflect the longest one.
        let text = resolver.source().text.lock().unwrap().clone();
        let expected = extract(&text).resolve();
        assert_eq!(
            expected.map(|t| t.target_time),
            Some(dt("2024-01-01 10:08:00"))
        );
        assert_eq!(resolver.snapshot(), expected);
    }
}
