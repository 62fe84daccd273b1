//! Common UI components.
//!
//! This module contains the header bar, status bar, help overlay and the
//! terminal-too-small notice.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_age;
use crate::data::health_slot;

use super::render::{EXEC_SLOT, RISK_SLOT};

/// Render the header: title and one health badge per source on the first
/// line, executor mode and risk badges on the second.
///
/// A source that has not finished its first cycle shows nothing.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " SPARK CONSOLE ",
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
    ];

    for kind in app.kinds() {
        if let Some(span) = slot_span(app, &health_slot(kind)) {
            spans.push(span);
            spans.push(Span::raw("  "));
        }
    }

    if app.paused {
        spans.push(Span::styled(
            "│ PAUSED",
            Style::default()
                .fg(app.theme.error)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let mut badges = vec![Span::raw(" ")];
    for slot in [EXEC_SLOT, RISK_SLOT] {
        if let Some(span) = slot_span(app, slot) {
            badges.push(span);
            badges.push(Span::raw("  "));
        }
    }

    let lines = vec![Line::from(spans), Line::from(badges)];
    frame.render_widget(Paragraph::new(lines), area);
}

fn slot_span(app: &App, slot: &str) -> Option<Span<'static>> {
    let text = app.surface.text(slot)?;
    Some(Span::styled(
        text.to_string(),
        app.theme.marker_style(app.surface.marker(slot)),
    ))
}

/// Render the status bar at the bottom.
///
/// Shows the age of each surface's last successful update and the
/// available controls, or a temporary status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let ages: Vec<String> = app
        .kinds()
        .into_iter()
        .map(|kind| match app.last_update_age(kind) {
            Some(age) => format!("{} {}", kind.name(), format_age(age)),
            None => format!("{} -", kind.name()),
        })
        .collect();

    let controls = if app.paused {
        "p:resume t:theme e:export ?:help q:quit"
    } else {
        "p:pause t:theme e:export ?:help q:quit"
    };

    let status = format!(" Updated: {} | {}", ages.join(" "), controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Positions"),
        Line::from("  ↑/↓ j/k     Select position"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" General"),
        Line::from("  p           Pause/resume polling"),
        Line::from("  t           Toggle light/dark theme"),
        Line::from("  e           Export surface to JSON"),
        Line::from("  ?           Toggle this help"),
        Line::from("  q / Esc     Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 17u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render the notice shown when the terminal is below the minimum size.
pub fn render_too_small(frame: &mut Frame, app: &App, area: Rect, min_width: u16, min_height: u16) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, min_width, min_height
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.error));
    let top = area.y + (area.height / 2).saturating_sub(2);
    let height = 5u16.min(area.height);
    frame.render_widget(paragraph, Rect::new(area.x, top, area.width, height));
}
