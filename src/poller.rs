//! Recurring fetch cycles.
//!
//! The [`Poller`] runs one background task per source. Each task fetches
//! immediately, then once per interval, decodes the body and sends a
//! [`CycleReport`] to the controller. Tasks never touch the display; the
//! controller applies reports on the UI thread.
//!
//! ## Scheduling
//!
//! A task awaits its fetch before waiting for the next tick, so a source has
//! at most one request in flight. Ticks use [`MissedTickBehavior::Delay`]:
//! with fast responses requests start exactly one interval apart; when a
//! response is slower than the interval the next request starts as soon as
//! it completes and later ticks shift accordingly. Overlapping requests for
//! the same source never happen.
//!
//! ## Cancellation
//!
//! [`Poller::stop`] signals the task through a watch channel. A request that
//! is in flight completes and its result is dropped. Reports already queued
//! from a stopped cycle are recognised by their generation number (see
//! [`Poller::is_current`]).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::data::Snapshot;
use crate::source::{DataSource, FetchError, SourceKind};

/// Capacity of the report channel.
pub const REPORT_BUFFER: usize = 64;

/// tokio panics on a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Outcome of one polling cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub kind: SourceKind,
    /// Identifies the `start` call that produced this report.
    pub generation: u64,
    /// When the request was issued.
    pub started_at: Instant,
    pub outcome: Result<Snapshot, FetchError>,
}

/// Fetch and decode one body.
pub async fn run_cycle(source: &dyn DataSource) -> Result<Snapshot, FetchError> {
    let body = source.fetch().await?;
    Snapshot::decode(source.kind(), &body)
}

#[derive(Debug)]
struct CycleHandle {
    stop_tx: watch::Sender<bool>,
    generation: u64,
    interval: Duration,
}

/// Owns the recurring fetch cycles of all sources.
///
/// Dropping the poller stops every cycle.
#[derive(Debug)]
pub struct Poller {
    runtime: Handle,
    reports: mpsc::Sender<CycleReport>,
    cycles: HashMap<SourceKind, CycleHandle>,
    next_generation: u64,
}

impl Poller {
    /// Create a poller that spawns on `runtime` and reports to `reports`.
    pub fn new(runtime: Handle, reports: mpsc::Sender<CycleReport>) -> Self {
        Self {
            runtime,
            reports,
            cycles: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Create a poller together with its report receiver.
    pub fn channel(runtime: Handle) -> (Self, mpsc::Receiver<CycleReport>) {
        let (tx, rx) = mpsc::channel(REPORT_BUFFER);
        (Self::new(runtime, tx), rx)
    }

    /// Begin polling a source. The first fetch fires immediately.
    ///
    /// A cycle already running for the same kind is stopped first. Returns
    /// the generation number carried by this cycle's reports.
    pub fn start(&mut self, source: Arc<dyn DataSource>, interval: Duration) -> u64 {
        let kind = source.kind();
        self.stop(kind);

        let generation = self.next_generation;
        self.next_generation += 1;

        let interval = interval.max(MIN_INTERVAL);
        let (stop_tx, stop_rx) = watch::channel(false);
        info!(
            "starting {} cycle every {:?} ({})",
            kind,
            interval,
            source.description()
        );

        self.runtime.spawn(cycle_loop(
            source,
            interval,
            generation,
            self.reports.clone(),
            stop_rx,
        ));

        self.cycles.insert(
            kind,
            CycleHandle {
                stop_tx,
                generation,
                interval,
            },
        );
        generation
    }

    /// Stop a source's cycle. Returns false if it was not running.
    pub fn stop(&mut self, kind: SourceKind) -> bool {
        match self.cycles.remove(&kind) {
            Some(handle) => {
                let _ = handle.stop_tx.send(true);
                debug!("stopped {} cycle (generation {})", kind, handle.generation);
                true
            }
            None => false,
        }
    }

    /// Stop every cycle.
    pub fn stop_all(&mut self) {
        let kinds: Vec<SourceKind> = self.cycles.keys().copied().collect();
        for kind in kinds {
            self.stop(kind);
        }
    }

    pub fn is_running(&self, kind: SourceKind) -> bool {
        self.cycles.contains_key(&kind)
    }

    /// Interval of a running cycle.
    pub fn interval(&self, kind: SourceKind) -> Option<Duration> {
        self.cycles.get(&kind).map(|h| h.interval)
    }

    /// Whether a report comes from the cycle currently running for its kind.
    pub fn is_current(&self, report: &CycleReport) -> bool {
        self.cycles
            .get(&report.kind)
            .is_some_and(|h| h.generation == report.generation)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop_all();
    }
}

async fn cycle_loop(
    source: Arc<dyn DataSource>,
    interval: Duration,
    generation: u64,
    reports: mpsc::Sender<CycleReport>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let kind = source.kind();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let started_at = Instant::now();
                let outcome = run_cycle(source.as_ref()).await;

                // Stopped while the request was in flight
                if *stop_rx.borrow() || stop_rx.has_changed().is_err() {
                    debug!("discarding in-flight {} result after stop", kind);
                    break;
                }

                match &outcome {
                    Ok(_) => debug!("{} cycle ok in {:?}", kind, started_at.elapsed()),
                    Err(e) => warn!("{} cycle failed: {}", kind, e),
                }

                let report = CycleReport {
                    kind,
                    generation,
                    started_at,
                    outcome,
                };
                if reports.send(report).await.is_err() {
                    // Controller dropped
                    break;
                }
            }
        }
    }

    debug!("{} cycle (generation {}) exited", kind, generation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSource;

    fn drain(rx: &mut mpsc::Receiver<CycleReport>) -> Vec<CycleReport> {
        let mut out = Vec::new();
        while let Ok(report) = rx.try_recv() {
            out.push(report);
        }
        out
    }

    fn count(reports: &[CycleReport], kind: SourceKind) -> usize {
        reports.iter().filter(|r| r.kind == kind).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_schedules() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let metrics = Arc::new(ScriptedSource::new(SourceKind::Metrics).with_body("{}"));
        let balance = Arc::new(ScriptedSource::new(SourceKind::Balance).with_body("{}"));

        poller.start(metrics.clone(), Duration::from_millis(2000));
        poller.start(balance.clone(), Duration::from_millis(5000));

        tokio::time::sleep(Duration::from_millis(9_900)).await;

        let reports = drain(&mut rx);
        assert_eq!(count(&reports, SourceKind::Metrics), 5);
        assert_eq!(count(&reports, SourceKind::Balance), 2);
        assert_eq!(metrics.calls(), 5);
        assert_eq!(balance.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let source = Arc::new(ScriptedSource::new(SourceKind::Balance).with_body("{}"));

        poller.start(source, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_cycle_or_other_sources() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let broken = Arc::new(ScriptedSource::new(SourceKind::Metrics).with_body("{oops"));
        let healthy = Arc::new(ScriptedSource::new(SourceKind::Balance).with_body("{}"));

        poller.start(broken, Duration::from_secs(1));
        poller.start(healthy, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        let reports = drain(&mut rx);
        let metrics: Vec<_> = reports.iter().filter(|r| r.kind == SourceKind::Metrics).collect();
        assert_eq!(metrics.len(), 3);
        assert!(metrics
            .iter()
            .all(|r| matches!(r.outcome, Err(FetchError::Parse(_)))));
        assert_eq!(count(&reports, SourceKind::Balance), 3);
        assert!(reports
            .iter()
            .filter(|r| r.kind == SourceKind::Balance)
            .all(|r| r.outcome.is_ok()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_cycle() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let source = Arc::new(ScriptedSource::new(SourceKind::Positions).with_body("[]"));

        poller.start(source.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(drain(&mut rx).len(), 3);

        assert!(poller.stop(SourceKind::Positions));
        assert!(!poller.is_running(SourceKind::Positions));
        assert!(!poller.stop(SourceKind::Positions));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_discarded_after_stop() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let slow = Arc::new(
            ScriptedSource::new(SourceKind::Metrics)
                .with_body("{}")
                .with_latency(Duration::from_secs(3)),
        );

        poller.start(slow.clone(), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(slow.calls(), 1);

        poller.stop(SourceKind::Metrics);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_queued_reports() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let source = Arc::new(ScriptedSource::new(SourceKind::Balance).with_body("{}"));

        let first = poller.start(source.clone(), Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = poller.start(source.clone(), Duration::from_secs(5));
        assert_ne!(first, second);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let reports = drain(&mut rx);
        assert_eq!(reports.len(), 2);
        assert!(!poller.is_current(&reports[0]));
        assert!(poller.is_current(&reports[1]));
        assert_eq!(poller.interval(SourceKind::Balance), Some(Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_is_serialized() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let slow = Arc::new(
            ScriptedSource::new(SourceKind::Metrics)
                .with_body("{}")
                .with_latency(Duration::from_secs(3)),
        );

        poller.start(slow.clone(), Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        // Requests start at 0s, 3s, 6s, 9s; the fourth is still in flight
        let reports = drain(&mut rx);
        assert_eq!(reports.len(), 3);
        assert_eq!(slow.calls(), 4);
        let gap = reports[1].started_at - reports[0].started_at;
        assert!(gap >= Duration::from_secs(3) && gap < Duration::from_millis(3_010), "{:?}", gap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_cycles() {
        let (mut poller, mut rx) = Poller::channel(Handle::current());
        let source = Arc::new(ScriptedSource::new(SourceKind::Balance).with_body("{}"));
        poller.start(source.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(poller);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_cycle_decodes_body() {
        let source = ScriptedSource::new(SourceKind::Positions).with_body("[]");
        assert_eq!(run_cycle(&source).await, Ok(Snapshot::Positions(vec![])));

        let source = ScriptedSource::new(SourceKind::Positions).with_error(FetchError::Status(500));
        assert_eq!(run_cycle(&source).await, Err(FetchError::Status(500)));
    }
}
