//! Console configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! config file, `SPARK_CONSOLE_*` environment variables, and command-line
//! overrides applied by the binary.
//!
//! ```toml
//! api_base = "http://127.0.0.1:8000"
//! gateway_base = "http://127.0.0.1:8000"
//! balance_interval = "5s"
//! positions_interval = "5s"
//! metrics_interval = "2s"
//! alerts_interval = "10s"
//! alerts_enabled = true
//! executor_interval = "10s"
//! risk_interval = "10s"
//! executor_enabled = true
//! request_timeout = "4s"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration;
use crate::source::{join_url, SourceKind};

/// Prefix for environment overrides, e.g. `SPARK_CONSOLE_METRICS_INTERVAL=1s`.
pub const ENV_PREFIX: &str = "SPARK_CONSOLE";

/// Endpoints and polling periods.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL serving `/api/balance` and `/api/positions`.
    pub api_base: String,
    /// Base URL of the gateway serving `/proxy/ai/metrics`, `/proxy/alerts/health`
    /// and the `/proxy/executor/*` endpoints.
    pub gateway_base: String,
    /// Period of the balance cycle.
    #[serde(deserialize_with = "duration::deserialize")]
    pub balance_interval: Duration,
    /// Period of the positions cycle.
    #[serde(deserialize_with = "duration::deserialize")]
    pub positions_interval: Duration,
    /// Period of the aggregate metrics cycle.
    #[serde(deserialize_with = "duration::deserialize")]
    pub metrics_interval: Duration,
    /// Period of the alerts health check.
    #[serde(deserialize_with = "duration::deserialize")]
    pub alerts_interval: Duration,
    /// Whether to check the alerts service at all.
    pub alerts_enabled: bool,
    /// Period of the executor settings (trading mode) cycle.
    #[serde(deserialize_with = "duration::deserialize")]
    pub executor_interval: Duration,
    /// Period of the executor risk limits cycle.
    #[serde(deserialize_with = "duration::deserialize")]
    pub risk_interval: Duration,
    /// Whether to poll the executor endpoints at all.
    pub executor_enabled: bool,
    /// Per-request timeout; a timed out request fails its cycle.
    #[serde(deserialize_with = "duration::deserialize")]
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            gateway_base: "http://127.0.0.1:8000".to_string(),
            balance_interval: Duration::from_secs(5),
            positions_interval: Duration::from_secs(5),
            metrics_interval: Duration::from_secs(2),
            alerts_interval: Duration::from_secs(10),
            alerts_enabled: true,
            executor_interval: Duration::from_secs(10),
            risk_interval: Duration::from_secs(10),
            executor_enabled: true,
            request_timeout: Duration::from_secs(4),
        }
    }
}

impl DashboardConfig {
    /// Load from an optional file plus environment overrides.
    ///
    /// The result is not validated; callers apply their own overrides first
    /// and then call [`DashboardConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Reject settings that cannot be polled.
    pub fn validate(&self) -> Result<()> {
        for (name, base) in [("api_base", &self.api_base), ("gateway_base", &self.gateway_base)] {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                bail!("{} must be an http(s) URL, got {:?}", name, base);
            }
        }
        for kind in SourceKind::ALL {
            if let Some(interval) = self.interval(kind) {
                if interval.is_zero() {
                    bail!("{} interval must be greater than zero", kind);
                }
            }
        }
        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than zero");
        }
        Ok(())
    }

    /// Polling period of a source, `None` if it is disabled.
    pub fn interval(&self, kind: SourceKind) -> Option<Duration> {
        match kind {
            SourceKind::Balance => Some(self.balance_interval),
            SourceKind::Positions => Some(self.positions_interval),
            SourceKind::Metrics => Some(self.metrics_interval),
            SourceKind::Alerts => self.alerts_enabled.then_some(self.alerts_interval),
            SourceKind::Executor => self.executor_enabled.then_some(self.executor_interval),
            SourceKind::Risk => self.executor_enabled.then_some(self.risk_interval),
        }
    }

    /// Full URL polled for a source.
    pub fn url(&self, kind: SourceKind) -> String {
        match kind {
            SourceKind::Balance => join_url(&self.api_base, "/api/balance"),
            SourceKind::Positions => join_url(&self.api_base, "/api/positions"),
            SourceKind::Metrics => join_url(&self.gateway_base, "/proxy/ai/metrics"),
            SourceKind::Alerts => join_url(&self.gateway_base, "/proxy/alerts/health"),
            SourceKind::Executor => join_url(&self.gateway_base, "/proxy/executor/settings"),
            SourceKind::Risk => join_url(&self.gateway_base, "/proxy/executor/risk"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.interval(SourceKind::Balance), Some(Duration::from_secs(5)));
        assert_eq!(config.interval(SourceKind::Positions), Some(Duration::from_secs(5)));
        assert_eq!(config.interval(SourceKind::Metrics), Some(Duration::from_secs(2)));
        assert_eq!(config.interval(SourceKind::Alerts), Some(Duration::from_secs(10)));
        assert_eq!(config.interval(SourceKind::Executor), Some(Duration::from_secs(10)));
        assert_eq!(config.interval(SourceKind::Risk), Some(Duration::from_secs(10)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_urls() {
        let config = DashboardConfig {
            api_base: "http://api:8000/".to_string(),
            gateway_base: "https://gw.example".to_string(),
            ..Default::default()
        };
        assert_eq!(config.url(SourceKind::Balance), "http://api:8000/api/balance");
        assert_eq!(config.url(SourceKind::Positions), "http://api:8000/api/positions");
        assert_eq!(config.url(SourceKind::Metrics), "https://gw.example/proxy/ai/metrics");
        assert_eq!(config.url(SourceKind::Alerts), "https://gw.example/proxy/alerts/health");
        assert_eq!(
            config.url(SourceKind::Executor),
            "https://gw.example/proxy/executor/settings"
        );
        assert_eq!(config.url(SourceKind::Risk), "https://gw.example/proxy/executor/risk");
    }

    #[test]
    fn test_alerts_disabled() {
        let config = DashboardConfig {
            alerts_enabled: false,
            ..Default::default()
        };
        assert_eq!(config.interval(SourceKind::Alerts), None);
    }

    #[test]
    fn test_executor_disabled() {
        let config = DashboardConfig {
            executor_enabled: false,
            ..Default::default()
        };
        assert_eq!(config.interval(SourceKind::Executor), None);
        assert_eq!(config.interval(SourceKind::Risk), None);
        assert_eq!(config.interval(SourceKind::Metrics), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_validate_rejects_zero_risk_interval() {
        let config = DashboardConfig {
            risk_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let disabled = DashboardConfig {
            executor_enabled: false,
            ..config
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = DashboardConfig {
            metrics_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = DashboardConfig {
            api_base: "localhost:8000".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api_base"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
api_base = "http://10.0.0.5:8000"
metrics_interval = "500ms"
balance_interval = 3000
alerts_enabled = false
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_base, "http://10.0.0.5:8000");
        assert_eq!(config.metrics_interval, Duration::from_millis(500));
        assert_eq!(config.balance_interval, Duration::from_secs(3));
        assert_eq!(config.positions_interval, Duration::from_secs(5));
        assert!(!config.alerts_enabled);
    }

    #[test]
    fn test_load_leaves_validation_to_caller() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "metrics_interval = 0").unwrap();
        file.flush().unwrap();

        let mut config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.metrics_interval, Duration::ZERO);
        assert!(config.validate().is_err());

        // A command-line override can still repair a bad file value.
        config.metrics_interval = Duration::from_secs(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(DashboardConfig::load(Some(Path::new("/nonexistent/spark.toml"))).is_err());
    }
}
