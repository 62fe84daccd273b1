//! Terminal rendering.
//!
//! ## Submodules
//!
//! - [`format`]: Number, currency and percent formatting
//! - [`view`]: The [`View`] trait and the in-memory [`Surface`]
//! - [`render`]: Writes decoded snapshots and errors into surface slots
//! - [`panels`]: Balance, metrics and positions panels drawn from the surface
//! - [`common`]: Header, status bar and help overlay
//! - [`theme`]: Light and dark themes

pub mod common;
pub mod format;
pub mod panels;
pub mod render;
pub mod theme;
pub mod view;

pub use theme::Theme;
pub use view::{Cell, Marker, Surface, View};

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Draw the whole dashboard.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        common::render_too_small(frame, app, area, MIN_WIDTH, MIN_HEIGHT);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(2),  // Header: health, then executor badges
        Constraint::Length(15), // Balance | Metrics
        Constraint::Min(4),     // Positions
        Constraint::Length(1),  // Status bar
    ])
    .split(area);

    let top = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    common::render_header(frame, app, chunks[0]);
    panels::render_balance(frame, app, top[0]);
    panels::render_metrics(frame, app, top[1]);
    panels::render_positions(frame, app, chunks[2]);
    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
