//! # spark-console
//!
//! A terminal dashboard for a trading backend.
//!
//! The console polls a few JSON endpoints on independent schedules (account
//! balance, open positions, aggregate AI metrics, executor mode and risk
//! limits, and an alerts health check), formats the values, and shows them in a ratatui TUI together with
//! an OK/FAIL badge per endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Application                            │
//! │                                                                  │
//! │  ┌──────────┐  fetch   ┌──────────┐  CycleReport  ┌──────────┐   │
//! │  │  source  │◀─────────│  poller  │──────────────▶│   app    │   │
//! │  │ Http/File│  body    │ (tokio)  │    (mpsc)     │(UI thread)   │
//! │  └──────────┘─────────▶└──────────┘               └────┬─────┘   │
//! │                                                        │         │
//! │                         data::Snapshot ──▶ ui::render  ▼         │
//! │                                            ui::Surface ──▶ TUI   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`DataSource`] trait with [`HttpSource`] and [`FileSource`]
//! - **[`poller`]**: One recurring cycle per source, serialized per source
//! - **[`data`]**: Response models, lenient decoding and OK/FAIL health tracking
//! - **[`ui`]**: Formatting, the slot-based [`View`] abstraction and ratatui panels
//! - **[`app`]**: The controller that applies cycle reports on the UI thread
//! - **[`config`]**: Endpoints and intervals from defaults, file and environment
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll a local backend
//! spark-console --api http://localhost:8000 --gateway http://localhost:8000
//!
//! # Serve every surface from fixture files in ./fixtures
//! spark-console --file-dir fixtures
//!
//! # One cycle per endpoint, print the surface as JSON
//! spark-console --once
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use spark_console::{http_sources, App, DashboardConfig};
//!
//! # tokio_test::block_on(async {
//! let config = DashboardConfig::default();
//! let mut app = App::new(http_sources(&config).unwrap(), tokio::runtime::Handle::current());
//! app.refresh_once().await;
//! println!("{}", serde_json::to_string_pretty(&app.surface).unwrap());
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod poller;
pub mod source;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use app::{file_sources, http_sources, App, Schedule};
pub use config::DashboardConfig;
pub use data::{
    BalanceSnapshot, ConnectionHealth, ExecutorSettings, HealthStatus, MetricsSnapshot, Position,
    RiskSnapshot, Snapshot,
};
pub use poller::{CycleReport, Poller};
pub use source::{DataSource, FetchError, FileSource, HttpSource, SourceKind};
pub use ui::{Marker, Surface, Theme, View};
