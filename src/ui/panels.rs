//! Balance, metrics and positions panels.
//!
//! Panels only read the [`Surface`](super::view::Surface); every value they
//! show was formatted by [`render`](super::render) when its report arrived.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::render::POSITIONS_SLOT;

/// Width of the label column in the key/value panels.
const LABEL_WIDTH: usize = 16;

const BALANCE_FIELDS: &[(&str, &str)] = &[
    ("Total Balance", "balance.total"),
    ("Available", "balance.available"),
    ("Total PnL", "balance.pnl_total"),
    ("Today's PnL", "balance.pnl_today"),
    ("Win Rate", "balance.win_rate"),
    ("Sharpe Ratio", "balance.sharpe"),
    ("Max Drawdown", "balance.max_drawdown"),
];

const METRICS_FIELDS: &[(&str, &str)] = &[
    ("Equity", "metrics.equity"),
    ("Total PnL", "metrics.pnl_total"),
    ("Day PnL", "metrics.pnl_day"),
    ("Max Drawdown", "metrics.max_drawdown"),
    ("Sharpe", "metrics.sharpe"),
    ("Win Rate", "metrics.win_rate"),
    ("Trades", "metrics.trades"),
    ("Episode", "metrics.episode"),
    ("Avg Reward", "metrics.avg_reward"),
    ("Volatility", "metrics.volatility"),
    ("VaR 95", "metrics.var95"),
    ("Signal", "metrics.recommendation"),
    ("Updated", "metrics.timestamp"),
];

fn panel_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// One `label  value` line, styled by the slot's marker.
fn field_line<'a>(app: &'a App, label: &'a str, slot: &str) -> Line<'a> {
    let value = match app.surface.text(slot) {
        Some(text) => Span::styled(text, app.theme.marker_style(app.surface.marker(slot))),
        None => Span::styled("…", Style::default().add_modifier(Modifier::DIM)),
    };
    Line::from(vec![
        Span::styled(format!(" {:<width$}", label, width = LABEL_WIDTH), app.theme.label),
        value,
    ])
}

fn render_fields(frame: &mut Frame, app: &App, area: Rect, title: &str, fields: &[(&str, &str)]) {
    let lines: Vec<Line> = fields
        .iter()
        .map(|(label, slot)| field_line(app, label, slot))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel_block(app, title)), area);
}

/// Render the account balance panel.
pub fn render_balance(frame: &mut Frame, app: &App, area: Rect) {
    render_fields(frame, app, area, " Balance ", BALANCE_FIELDS);
}

/// Render the aggregate metrics panel.
pub fn render_metrics(frame: &mut Frame, app: &App, area: Rect) {
    render_fields(frame, app, area, " AI Metrics ", METRICS_FIELDS);
}

/// Render the positions table, or the slot's text (placeholder or error).
pub fn render_positions(frame: &mut Frame, app: &App, area: Rect) {
    let Some(rows) = app.surface.rows(POSITIONS_SLOT) else {
        let (text, style) = match app.surface.text(POSITIONS_SLOT) {
            Some(text) => (
                text,
                app.theme
                    .marker_style(app.surface.marker(POSITIONS_SLOT))
                    .add_modifier(Modifier::DIM),
            ),
            None => ("Loading...", Style::default().add_modifier(Modifier::DIM)),
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {}", text), style)))
            .block(panel_block(app, " Positions "));
        frame.render_widget(paragraph, area);
        return;
    };

    let header = Row::new(vec![
        Cell::from("Symbol"),
        Cell::from("Size"),
        Cell::from("Entry"),
        Cell::from("Current"),
        Cell::from("PnL"),
    ])
    .height(1)
    .style(app.theme.header);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|cells| {
            Row::new(cells.iter().map(|cell| {
                Cell::from(cell.text.as_str()).style(app.theme.marker_style(cell.marker))
            }))
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Symbol
        Constraint::Fill(1), // Size
        Constraint::Fill(1), // Entry
        Constraint::Fill(1), // Current
        Constraint::Fill(1), // PnL
    ];

    let selected = app.selected_position.min(rows.len().saturating_sub(1));
    let title = format!(" Positions [{}/{}] ", selected + 1, rows.len());

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(panel_block(app, &title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
