//! Application state and the report-applying controller.
//!
//! [`App`] owns the [`Poller`], drains its [`CycleReport`]s on the UI thread
//! and applies each one to the [`Surface`] and [`HealthStatus`]. Nothing else
//! writes to the surface, so rendering is serialized even though cycles run
//! concurrently.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::data::HealthStatus;
use crate::poller::{run_cycle, CycleReport, Poller};
use crate::source::{DataSource, FileSource, HttpSource, SourceKind};
use crate::ui::render::{render_error, render_snapshot, POSITIONS_SLOT};
use crate::ui::view::Surface;
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// A source together with its polling period.
pub type Schedule = Vec<(Arc<dyn DataSource>, Duration)>;

/// Build HTTP sources for every enabled endpoint, sharing one client.
pub fn http_sources(config: &DashboardConfig) -> Result<Schedule> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("failed to build HTTP client")?;

    Ok(SourceKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let interval = config.interval(kind)?;
            let source = HttpSource::with_client(kind, config.url(kind), client.clone());
            Some((Arc::new(source) as Arc<dyn DataSource>, interval))
        })
        .collect())
}

/// Build file sources reading `<dir>/<kind>.json` for every enabled endpoint.
pub fn file_sources(config: &DashboardConfig, dir: &Path) -> Schedule {
    SourceKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let interval = config.interval(kind)?;
            let source = FileSource::in_dir(kind, dir);
            Some((Arc::new(source) as Arc<dyn DataSource>, interval))
        })
        .collect()
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub paused: bool,

    /// Display slots written by rendering and health tracking.
    pub surface: Surface,
    pub health: HealthStatus,

    // Polling
    sources: Schedule,
    poller: Poller,
    reports: mpsc::Receiver<CycleReport>,
    last_update: BTreeMap<SourceKind, Instant>,

    // Navigation state
    pub selected_position: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an app polling `sources`, spawning cycles on `runtime`.
    ///
    /// Nothing is fetched until [`App::start`] is called.
    pub fn new(sources: Schedule, runtime: Handle) -> Self {
        let (poller, reports) = Poller::channel(runtime);
        Self {
            running: true,
            show_help: false,
            paused: false,
            surface: Surface::new(),
            health: HealthStatus::new(),
            sources,
            poller,
            reports,
            last_update: BTreeMap::new(),
            selected_position: 0,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Describe the configured sources, one per line.
    pub fn source_descriptions(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|(source, interval)| format!("{} every {:?}", source.description(), interval))
            .collect()
    }

    /// Start every polling cycle. Each source fetches immediately.
    pub fn start(&mut self) {
        for (source, interval) in &self.sources {
            self.poller.start(Arc::clone(source), *interval);
        }
        self.paused = false;
    }

    /// Stop every polling cycle. In-flight results are dropped.
    pub fn pause(&mut self) {
        self.poller.stop_all();
        self.paused = true;
        info!("polling paused");
    }

    pub fn resume(&mut self) {
        info!("polling resumed");
        self.start();
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
            self.set_status_message("Polling resumed".to_string());
        } else {
            self.pause();
            self.set_status_message("Polling paused".to_string());
        }
    }

    /// Apply every queued report. Returns how many were applied.
    ///
    /// Reports from cycles that have since been stopped or restarted are
    /// skipped.
    pub fn drain_reports(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(report) = self.reports.try_recv() {
            if !self.poller.is_current(&report) {
                debug!(
                    "skipping stale {} report (generation {})",
                    report.kind, report.generation
                );
                continue;
            }
            self.apply(report);
            applied += 1;
        }
        applied
    }

    /// Apply one cycle outcome to the surface and health state.
    pub fn apply(&mut self, report: CycleReport) {
        let kind = report.kind;
        match &report.outcome {
            Ok(snapshot) => {
                render_snapshot(&mut self.surface, snapshot);
                self.health.record(&mut self.surface, kind, true);
                self.last_update.insert(kind, Instant::now());
            }
            Err(e) => {
                render_error(&mut self.surface, kind, e);
                self.health.record(&mut self.surface, kind, false);
            }
        }

        if kind == SourceKind::Positions {
            self.clamp_selection();
        }
    }

    /// Run one cycle of every source concurrently and apply the results.
    ///
    /// Used for one-shot mode; does not involve the poller.
    pub async fn refresh_once(&mut self) -> usize {
        let mut tasks = JoinSet::new();
        for (source, _) in &self.sources {
            let source = Arc::clone(source);
            tasks.spawn(async move {
                let started_at = Instant::now();
                let outcome = run_cycle(source.as_ref()).await;
                CycleReport {
                    kind: source.kind(),
                    generation: 0,
                    started_at,
                    outcome,
                }
            });
        }

        let mut applied = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => {
                    if let Err(e) = &report.outcome {
                        warn!("{} cycle failed: {}", report.kind, e);
                    }
                    self.apply(report);
                    applied += 1;
                }
                Err(e) => warn!("cycle task failed: {}", e),
            }
        }
        applied
    }

    /// Time since a source last rendered successfully.
    pub fn last_update_age(&self, kind: SourceKind) -> Option<Duration> {
        self.last_update.get(&kind).map(|t| t.elapsed())
    }

    /// Sources with a schedule, in display order.
    pub fn kinds(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<SourceKind> = self.sources.iter().map(|(s, _)| s.kind()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// Number of rows in the positions table.
    pub fn position_count(&self) -> usize {
        self.surface.rows(POSITIONS_SLOT).map_or(0, |rows| rows.len())
    }

    /// Move selection down by one position.
    pub fn select_next(&mut self) {
        let max = self.position_count().saturating_sub(1);
        self.selected_position = (self.selected_position + 1).min(max);
    }

    /// Move selection up by one position.
    pub fn select_prev(&mut self) {
        self.selected_position = self.selected_position.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_position = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_position = self.position_count().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max = self.position_count().saturating_sub(1);
        if self.selected_position > max {
            self.selected_position = max;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the current surface to a JSON file.
    pub fn export_surface(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.surface)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
