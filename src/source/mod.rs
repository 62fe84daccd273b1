//! Data source abstraction for the backend endpoints.
//!
//! A source fetches the raw body for one surface. Decoding into a
//! [`Snapshot`](crate::data::Snapshot) happens in the polling cycle, so a
//! malformed body takes the same path whichever source produced it.

mod error;
mod file;
mod http;

pub use error::FetchError;
pub use file::FileSource;
pub use http::HttpSource;
pub(crate) use http::join_url;

use std::fmt::{self, Debug};

use async_trait::async_trait;
use serde::Serialize;

/// The endpoints the console polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// `GET /api/balance`
    Balance,
    /// `GET /api/positions`
    Positions,
    /// `GET /proxy/ai/metrics` on the gateway
    Metrics,
    /// `GET /proxy/alerts/health` on the gateway, health only
    Alerts,
    /// `GET /proxy/executor/settings` on the gateway, trading mode badge
    Executor,
    /// `GET /proxy/executor/risk` on the gateway, risk limits badge
    Risk,
}

impl SourceKind {
    /// All kinds, in display order.
    pub const ALL: [SourceKind; 6] = [
        SourceKind::Balance,
        SourceKind::Positions,
        SourceKind::Metrics,
        SourceKind::Alerts,
        SourceKind::Executor,
        SourceKind::Risk,
    ];

    /// Short lowercase name, used in slot names, file names and logs.
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Balance => "balance",
            SourceKind::Positions => "positions",
            SourceKind::Metrics => "metrics",
            SourceKind::Alerts => "alerts",
            SourceKind::Executor => "executor",
            SourceKind::Risk => "risk",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for fetching one surface's data from a backend.
///
/// Implementations return the raw response body. A non-success status or a
/// transport failure is an error; the body itself is not validated here.
///
/// # Example
///
/// ```no_run
/// use spark_console::{DataSource, HttpSource, SourceKind};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::new(
///     SourceKind::Balance,
///     "http://localhost:8000/api/balance",
///     Duration::from_secs(5),
/// )
/// .unwrap();
/// let body = source.fetch().await;
/// # });
/// ```
#[async_trait]
pub trait DataSource: Send + Sync + Debug {
    /// Which surface this source feeds.
    fn kind(&self) -> SourceKind;

    /// Returns a human-readable description of the source.
    ///
    /// Used in logs.
    fn description(&self) -> &str;

    /// Fetch the current body.
    async fn fetch(&self) -> Result<String, FetchError>;
}
