//! Writes snapshots into display slots.
//!
//! Each surface has its own set of slots. Rendering a snapshot rewrites every
//! slot of its surface, so rendering the same snapshot twice leaves the view
//! unchanged and nothing from an older snapshot survives.
//!
//! | Surface   | Slots                        | Fallback | Primary slot     |
//! |-----------|------------------------------|----------|------------------|
//! | balance   | `balance.*`                  | zero     | `balance.total`  |
//! | metrics   | `metrics.*`                  | dash     | `metrics.equity` |
//! | positions | `positions` (rows or text)   | zero     | `positions`      |
//! | executor  | `header.exec`                | paper    | `header.exec`    |
//! | risk      | `header.risk`                | dash     | `header.risk`    |

use crate::data::{
    BalanceSnapshot, ExecutorSettings, MetricsSnapshot, Position, RiskSnapshot, Snapshot,
};
use crate::source::{FetchError, SourceKind};

use super::format;
use super::view::{Cell, Marker, View};

/// Text shown in the positions slot when there are no positions.
pub const NO_POSITIONS: &str = "No active positions";

/// Slot holding the positions table.
pub const POSITIONS_SLOT: &str = "positions";

/// Header badge with the executor trading mode.
pub const EXEC_SLOT: &str = "header.exec";

/// Header badge with the executor risk limits.
pub const RISK_SLOT: &str = "header.risk";

/// Loss usage at which the risk badge turns to a warning.
pub const RISK_WARNING_RATIO: f64 = 0.8;

/// How a field's marker is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    /// No marker; clears any previous one.
    Plain,
    /// Positive or negative by the sign of the raw value.
    Signed(Option<f64>),
}

/// One formatted value bound for a named slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub slot: &'static str,
    pub text: String,
    pub tone: Tone,
}

impl Field {
    pub fn plain(slot: &'static str, text: String) -> Self {
        Self {
            slot,
            text,
            tone: Tone::Plain,
        }
    }

    pub fn signed(slot: &'static str, text: String, raw: Option<f64>) -> Self {
        Self {
            slot,
            text,
            tone: Tone::Signed(raw),
        }
    }
}

/// Write a flat list of fields into their slots.
pub fn write_fields<V: View + ?Sized>(view: &mut V, fields: &[Field]) {
    for field in fields {
        view.set_text(field.slot, &field.text);
        let marker = match field.tone {
            Tone::Plain => None,
            Tone::Signed(raw) => Some(Marker::for_sign(raw)),
        };
        view.set_marker(field.slot, marker);
    }
}

/// Fields of the balance surface (zero fallback).
pub fn balance_fields(b: &BalanceSnapshot) -> Vec<Field> {
    vec![
        Field::plain("balance.total", format::currency(b.total_balance)),
        Field::plain("balance.available", format::currency(b.available_balance)),
        Field::signed("balance.pnl_total", format::currency(b.pnl_total), b.pnl_total),
        Field::signed("balance.pnl_today", format::currency(b.pnl_today), b.pnl_today),
        Field::plain("balance.win_rate", format::percent(b.win_rate)),
        Field::plain("balance.sharpe", format::fixed(b.sharpe_ratio, 2)),
        Field::signed(
            "balance.max_drawdown",
            format::percent(b.max_drawdown),
            b.max_drawdown,
        ),
    ]
}

/// Fields of the metrics surface (dash fallback).
pub fn metrics_fields(m: &MetricsSnapshot) -> Vec<Field> {
    vec![
        Field::plain("metrics.equity", format::number_default(m.equity)),
        Field::signed("metrics.pnl_total", format::number_default(m.pnl_total), m.pnl_total),
        Field::signed("metrics.pnl_day", format::number_default(m.pnl_day), m.pnl_day),
        Field::signed(
            "metrics.max_drawdown",
            format::number_default(m.max_drawdown),
            m.max_drawdown,
        ),
        Field::plain("metrics.sharpe", format::number_default(m.sharpe)),
        Field::plain("metrics.win_rate", format::number_default(m.win_rate)),
        Field::plain("metrics.trades", format::number(m.trades_count, 0)),
        Field::plain("metrics.episode", format::number(m.episode, 0)),
        Field::plain("metrics.avg_reward", format::number(m.avg_reward, 4)),
        Field::plain("metrics.volatility", format::number(m.volatility, 4)),
        Field::plain("metrics.var95", format::number(m.var95, 4)),
        Field::plain("metrics.recommendation", format::text(m.recommendation.as_deref())),
        Field::plain("metrics.timestamp", format::text(m.timestamp.as_deref())),
    ]
}

pub fn render_balance<V: View + ?Sized>(view: &mut V, balance: &BalanceSnapshot) {
    write_fields(view, &balance_fields(balance));
}

pub fn render_metrics<V: View + ?Sized>(view: &mut V, metrics: &MetricsSnapshot) {
    write_fields(view, &metrics_fields(metrics));
}

/// Render the positions table, or the placeholder when there are none.
///
/// Rows keep the input order.
pub fn render_positions<V: View + ?Sized>(view: &mut V, positions: &[Position]) {
    if positions.is_empty() {
        view.set_text(POSITIONS_SLOT, NO_POSITIONS);
    } else {
        let rows = positions.iter().map(position_row).collect();
        view.set_rows(POSITIONS_SLOT, rows);
    }
    view.set_marker(POSITIONS_SLOT, None);
}

fn position_row(p: &Position) -> Vec<Cell> {
    vec![
        Cell::plain(format::text(p.symbol.as_deref())),
        Cell::plain(format::fixed(p.size, 4)),
        Cell::plain(format::currency(p.entry_price)),
        Cell::plain(format::currency(p.current_price)),
        Cell::marked(
            format::currency(p.unrealized_pnl),
            Marker::for_sign(p.unrealized_pnl),
        ),
    ]
}

/// `exec: <mode>`; live trading is flagged like an error.
pub fn render_executor<V: View + ?Sized>(view: &mut V, settings: &ExecutorSettings) {
    view.set_text(EXEC_SLOT, &format!("exec: {}", settings.mode()));
    let marker = if settings.is_live() {
        Marker::Error
    } else {
        Marker::Ok
    };
    view.set_marker(EXEC_SLOT, Some(marker));
}

/// One-line summary of the risk limits and how much of the daily loss
/// limit is used.
pub fn render_risk<V: View + ?Sized>(view: &mut V, risk: &RiskSnapshot) {
    let mut text = format!(
        "risk: orders/min={} | loss/day={} | pos={} | notional={}",
        format::number_default(risk.max_orders_per_min),
        format::number_default(risk.daily_loss_limit),
        format::number_default(risk.max_position_qty),
        format::number_default(risk.max_notional),
    );
    let usage = risk.loss_usage();
    if let Some(ratio) = usage {
        text.push_str(&format!(" | used {:.0}%", ratio * 100.0));
    }
    if risk.blocked {
        text.push_str(" | BLOCKED");
        if let Some(reason) = risk.block_reason.as_deref().filter(|r| !r.is_empty()) {
            text.push_str(&format!(": {}", reason));
        }
    }

    let marker = if risk.blocked {
        Marker::Error
    } else if usage.is_some_and(|ratio| ratio >= RISK_WARNING_RATIO) {
        Marker::Warning
    } else {
        Marker::Ok
    };
    view.set_text(RISK_SLOT, &text);
    view.set_marker(RISK_SLOT, Some(marker));
}

/// Render any decoded snapshot onto its surface.
pub fn render_snapshot<V: View + ?Sized>(view: &mut V, snapshot: &Snapshot) {
    match snapshot {
        Snapshot::Balance(b) => render_balance(view, b),
        Snapshot::Positions(p) => render_positions(view, p),
        Snapshot::Metrics(m) => render_metrics(view, m),
        Snapshot::Executor(e) => render_executor(view, e),
        Snapshot::Risk(r) => render_risk(view, r),
        Snapshot::Empty => {}
    }
}

/// The slot that shows a surface's error placeholder.
pub fn primary_slot(kind: SourceKind) -> Option<&'static str> {
    match kind {
        SourceKind::Balance => Some("balance.total"),
        SourceKind::Positions => Some(POSITIONS_SLOT),
        SourceKind::Metrics => Some("metrics.equity"),
        SourceKind::Executor => Some(EXEC_SLOT),
        SourceKind::Risk => Some(RISK_SLOT),
        SourceKind::Alerts => None,
    }
}

/// Replace a surface's primary slot with an error placeholder.
///
/// Other slots of the surface keep their last values. Sources without a
/// widget are left alone. Header badges get a short form.
pub fn render_error<V: View + ?Sized>(view: &mut V, kind: SourceKind, error: &FetchError) {
    if let Some(slot) = primary_slot(kind) {
        let text = match kind {
            SourceKind::Executor => "exec: ?".to_string(),
            SourceKind::Risk => "risk: ERR".to_string(),
            _ => format!("Error loading {}: {}", kind.name(), error.short()),
        };
        view.set_text(slot, &text);
        view.set_marker(slot, Some(Marker::Error));
    }
}
