//! Snapshot types for the backend endpoints.
//!
//! These types match the JSON served by the gateway and the AI service.
//! Every numeric field is optional and parsed leniently: a field with the
//! wrong type is treated as absent rather than failing the snapshot. Only a
//! body of the wrong overall shape is a parse failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::{FetchError, SourceKind};

/// Account balance as served by `GET /api/balance`.
///
/// Missing fields are displayed as zero (see [`crate::ui::format::currency`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub available_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pnl_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pnl_today: Option<f64>,
    /// Already scaled to percent (67.8 means 67.8%).
    #[serde(default, deserialize_with = "lenient::number")]
    pub win_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub sharpe_ratio: Option<f64>,
    /// Already scaled to percent, usually negative.
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_drawdown: Option<f64>,
}

/// One open position from `GET /api/positions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "lenient::text")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub entry_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub unrealized_pnl: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pnl_percent: Option<f64>,
}

/// Aggregate performance metrics from the AI service.
///
/// Missing fields are displayed as a dash, never as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default, deserialize_with = "lenient::number")]
    pub equity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pnl_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pnl_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub sharpe: Option<f64>,
    /// Ratio in 0..1.
    #[serde(default, deserialize_with = "lenient::number")]
    pub win_rate: Option<f64>,
    /// Also read from `trades` when absent.
    #[serde(default, deserialize_with = "lenient::number")]
    pub trades_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub episode: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub avg_reward: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_drawdown: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub volatility: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub var95: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub timestamp: Option<String>,
}

/// Executor settings from `GET /proxy/executor/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// `paper` or `live`; absent means paper.
    #[serde(default, deserialize_with = "lenient::text")]
    pub mode: Option<String>,
}

impl ExecutorSettings {
    /// Trading mode, lowercased, `paper` when unset.
    pub fn mode(&self) -> String {
        match self.mode.as_deref().map(str::trim) {
            Some(mode) if !mode.is_empty() => mode.to_ascii_lowercase(),
            _ => "paper".to_string(),
        }
    }

    /// Orders reach the exchange.
    pub fn is_live(&self) -> bool {
        self.mode() == "live"
    }
}

/// Risk limits and daily state from `GET /proxy/executor/risk`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_orders_per_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub daily_loss_limit: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_position_qty: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub max_notional: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pnl_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub blocked: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub block_reason: Option<String>,
}

impl RiskSnapshot {
    /// Share of the daily loss limit used, in 0..=1.
    ///
    /// A blocked executor counts as fully used. `None` when there is no
    /// positive limit or no day PnL to compare against.
    pub fn loss_usage(&self) -> Option<f64> {
        if self.blocked {
            return Some(1.0);
        }
        match (self.daily_loss_limit, self.pnl_day) {
            (Some(limit), Some(pnl)) if limit > 0.0 => Some((pnl.abs() / limit).min(1.0)),
            _ => None,
        }
    }
}

/// A decoded response body for one source.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Balance(BalanceSnapshot),
    Positions(Vec<Position>),
    Metrics(MetricsSnapshot),
    Executor(ExecutorSettings),
    Risk(RiskSnapshot),
    /// Health-only endpoints carry no data.
    Empty,
}

impl Snapshot {
    /// Decode a response body according to the source it came from.
    pub fn decode(kind: SourceKind, body: &str) -> Result<Self, FetchError> {
        if kind == SourceKind::Alerts {
            return Ok(Snapshot::Empty);
        }

        let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

        match kind {
            SourceKind::Balance => {
                let object = expect_object(value, "balance")?;
                Ok(Snapshot::Balance(from_object(object)?))
            }
            SourceKind::Positions => {
                let items = match value {
                    Value::Array(items) => items,
                    Value::Object(mut map) => match map.remove("positions") {
                        Some(Value::Array(items)) => items,
                        _ => return Err(shape_error("positions", "an array")),
                    },
                    _ => return Err(shape_error("positions", "an array")),
                };
                let positions = items
                    .into_iter()
                    .map(|item| from_object(expect_object(item, "position")?))
                    .collect::<Result<Vec<Position>, _>>()?;
                Ok(Snapshot::Positions(positions))
            }
            SourceKind::Metrics => {
                let mut object = expect_object(value, "metrics")?;
                // Either wrapped as {"metrics": {...}} or served bare
                let mut inner = match object.remove("metrics") {
                    Some(Value::Object(inner)) => inner,
                    Some(other) => {
                        object.insert("metrics".to_string(), other);
                        object
                    }
                    None => object,
                };
                // Older services report the trade count as `trades`
                if matches!(inner.get("trades_count"), None | Some(Value::Null)) {
                    if let Some(trades) = inner.remove("trades") {
                        inner.insert("trades_count".to_string(), trades);
                    }
                }
                Ok(Snapshot::Metrics(from_object(inner)?))
            }
            SourceKind::Executor => {
                let mut object = expect_object(value, "executor settings")?;
                // {"settings": {"mode": ...}} or a bare settings object
                let inner = match object.remove("settings") {
                    Some(Value::Object(inner)) => inner,
                    _ => object,
                };
                Ok(Snapshot::Executor(from_object(inner)?))
            }
            SourceKind::Risk => {
                let mut object = expect_object(value, "risk")?;
                // Limits under "risk", daily counters under "state"
                let mut merged = serde_json::Map::new();
                for section in ["risk", "state"] {
                    if let Some(Value::Object(fields)) = object.remove(section) {
                        merged.extend(fields);
                    }
                }
                if merged.is_empty() {
                    merged = object;
                }
                Ok(Snapshot::Risk(from_object(merged)?))
            }
            SourceKind::Alerts => Ok(Snapshot::Empty),
        }
    }

    /// The source kind this snapshot belongs to, if it carries data.
    pub fn kind(&self) -> Option<SourceKind> {
        match self {
            Snapshot::Balance(_) => Some(SourceKind::Balance),
            Snapshot::Positions(_) => Some(SourceKind::Positions),
            Snapshot::Metrics(_) => Some(SourceKind::Metrics),
            Snapshot::Executor(_) => Some(SourceKind::Executor),
            Snapshot::Risk(_) => Some(SourceKind::Risk),
            Snapshot::Empty => None,
        }
    }
}

fn expect_object(value: Value, what: &str) -> Result<serde_json::Map<String, Value>, FetchError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(shape_error(what, "an object")),
    }
}

fn from_object<T: serde::de::DeserializeOwned>(
    map: serde_json::Map<String, Value>,
) -> Result<T, FetchError> {
    serde_json::from_value(Value::Object(map)).map_err(|e| FetchError::Parse(e.to_string()))
}

fn shape_error(what: &str, expected: &str) -> FetchError {
    FetchError::Parse(format!("expected {} for {}", expected, what))
}

/// Field deserializers that never fail on a wrong value type.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// A JSON number, or a string holding a finite decimal number.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(parsed.filter(|v| v.is_finite()))
    }

    /// `true` only for JSON `true`.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
    }

    /// A JSON string, or a number rendered as text.
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_balance() {
        let json = r#"{
            "total_balance": 15427.50,
            "available_balance": 8421.75,
            "pnl_total": 3247.50,
            "pnl_today": 142.30,
            "win_rate": 67.8,
            "sharpe_ratio": 1.24,
            "max_drawdown": -8.45
        }"#;

        let Snapshot::Balance(balance) = Snapshot::decode(SourceKind::Balance, json).unwrap() else {
            panic!("expected a balance snapshot");
        };
        assert_eq!(balance.total_balance, Some(15427.5));
        assert_eq!(balance.max_drawdown, Some(-8.45));
    }

    #[test]
    fn test_decode_balance_missing_and_wrong_types() {
        let json = r#"{"total_balance": "1200.5", "pnl_total": null, "win_rate": "n/a"}"#;

        let Snapshot::Balance(balance) = Snapshot::decode(SourceKind::Balance, json).unwrap() else {
            panic!("expected a balance snapshot");
        };
        assert_eq!(balance.total_balance, Some(1200.5));
        assert_eq!(balance.pnl_total, None);
        assert_eq!(balance.win_rate, None);
        assert_eq!(balance.available_balance, None);
    }

    #[test]
    fn test_decode_balance_rejects_array() {
        let err = Snapshot::decode(SourceKind::Balance, "[1, 2]").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_decode_positions_keeps_order_and_duplicates() {
        let json = r#"[
            {"symbol": "ETHUSDT", "size": 2.3, "unrealized_pnl": 188.14},
            {"symbol": "BTCUSDT", "size": 0.15, "unrealized_pnl": -10},
            {"symbol": "ETHUSDT", "size": 1.0}
        ]"#;

        let Snapshot::Positions(positions) = Snapshot::decode(SourceKind::Positions, json).unwrap()
        else {
            panic!("expected positions");
        };
        let symbols: Vec<_> = positions.iter().map(|p| p.symbol.as_deref().unwrap()).collect();
        assert_eq!(symbols, ["ETHUSDT", "BTCUSDT", "ETHUSDT"]);
        assert_eq!(positions[1].unrealized_pnl, Some(-10.0));
        assert_eq!(positions[2].unrealized_pnl, None);
    }

    #[test]
    fn test_decode_positions_wrapped() {
        let json = r#"{"ok": true, "positions": [{"symbol": "SOLUSDT"}]}"#;
        let snapshot = Snapshot::decode(SourceKind::Positions, json).unwrap();
        assert!(matches!(snapshot, Snapshot::Positions(ref p) if p.len() == 1));
    }

    #[test]
    fn test_decode_positions_rejects_scalar_items() {
        let err = Snapshot::decode(SourceKind::Positions, "[1, 2]").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_decode_metrics_wrapped_and_bare() {
        let wrapped = r#"{"ok": true, "metrics": {"equity": 10250.0, "sharpe": 1.2, "episode": 7}}"#;
        let bare = r#"{"equity": 10250.0, "sharpe": 1.2, "episode": 7}"#;

        let a = Snapshot::decode(SourceKind::Metrics, wrapped).unwrap();
        let b = Snapshot::decode(SourceKind::Metrics, bare).unwrap();
        assert_eq!(a, b);

        let Snapshot::Metrics(m) = a else {
            panic!("expected metrics");
        };
        assert_eq!(m.equity, Some(10250.0));
        assert_eq!(m.pnl_total, None);
    }

    #[test]
    fn test_decode_metrics_trades_fallback() {
        let json = r#"{"metrics": {"trades": 42}}"#;
        let Snapshot::Metrics(m) = Snapshot::decode(SourceKind::Metrics, json).unwrap() else {
            panic!("expected metrics");
        };
        assert_eq!(m.trades_count, Some(42.0));

        let json = r#"{"metrics": {"trades": 42, "trades_count": 40}}"#;
        let Snapshot::Metrics(m) = Snapshot::decode(SourceKind::Metrics, json).unwrap() else {
            panic!("expected metrics");
        };
        assert_eq!(m.trades_count, Some(40.0));
    }

    #[test]
    fn test_decode_executor_settings() {
        let wrapped = r#"{"ok": true, "settings": {"mode": "LIVE"}}"#;
        let Snapshot::Executor(settings) = Snapshot::decode(SourceKind::Executor, wrapped).unwrap()
        else {
            panic!("expected executor settings");
        };
        assert_eq!(settings.mode(), "live");
        assert!(settings.is_live());

        let empty = Snapshot::decode(SourceKind::Executor, r#"{"settings": {}}"#).unwrap();
        let Snapshot::Executor(settings) = empty else {
            panic!("expected executor settings");
        };
        assert_eq!(settings.mode(), "paper");
        assert!(!settings.is_live());

        let bare = Snapshot::decode(SourceKind::Executor, r#"{"mode": "paper"}"#).unwrap();
        assert_eq!(bare.kind(), Some(SourceKind::Executor));
    }

    #[test]
    fn test_decode_risk_merges_limits_and_state() {
        let json = r#"{
            "risk": {"max_orders_per_min": 30, "daily_loss_limit": 200, "max_position_qty": 1, "max_notional": 2000},
            "state": {"pnl_day": -170, "blocked": false, "block_reason": ""}
        }"#;
        let Snapshot::Risk(risk) = Snapshot::decode(SourceKind::Risk, json).unwrap() else {
            panic!("expected risk");
        };
        assert_eq!(risk.max_orders_per_min, Some(30.0));
        assert_eq!(risk.max_notional, Some(2000.0));
        assert_eq!(risk.pnl_day, Some(-170.0));
        assert!(!risk.blocked);
        assert_eq!(risk.loss_usage(), Some(0.85));
    }

    #[test]
    fn test_risk_loss_usage() {
        let blocked = RiskSnapshot {
            blocked: true,
            ..Default::default()
        };
        assert_eq!(blocked.loss_usage(), Some(1.0));

        let no_limit = RiskSnapshot {
            daily_loss_limit: Some(0.0),
            pnl_day: Some(-50.0),
            ..Default::default()
        };
        assert_eq!(no_limit.loss_usage(), None);

        let over = RiskSnapshot {
            daily_loss_limit: Some(100.0),
            pnl_day: Some(-250.0),
            ..Default::default()
        };
        assert_eq!(over.loss_usage(), Some(1.0));
    }

    #[test]
    fn test_decode_malformed_json() {
        for kind in [
            SourceKind::Balance,
            SourceKind::Positions,
            SourceKind::Metrics,
            SourceKind::Executor,
            SourceKind::Risk,
        ] {
            let err = Snapshot::decode(kind, "{not json").unwrap_err();
            assert!(matches!(err, FetchError::Parse(_)), "{:?}", kind);
        }
    }

    #[test]
    fn test_decode_alerts_ignores_body() {
        assert_eq!(
            Snapshot::decode(SourceKind::Alerts, "<html>ok</html>").unwrap(),
            Snapshot::Empty
        );
    }
}
