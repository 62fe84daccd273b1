//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use super::view::Marker;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Whether this is the light variant.
    pub light: bool,
    /// Accent color for titles and active elements.
    pub highlight: Color,
    /// Color for gains.
    pub positive: Color,
    /// Color for losses.
    pub negative: Color,
    /// Color for error placeholders.
    pub error: Color,
    /// Color for values nearing a limit.
    pub warning: Color,
    /// Color for the OK health badge.
    pub ok: Color,
    /// Color for the FAIL health badge.
    pub fail: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for field labels.
    pub label: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            light: false,
            highlight: Color::Cyan,
            positive: Color::Green,
            negative: Color::Red,
            error: Color::Yellow,
            warning: Color::LightYellow,
            ok: Color::Green,
            fail: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            light: true,
            highlight: Color::Blue,
            positive: Color::Green,
            negative: Color::Red,
            error: Color::Magenta,
            warning: Color::Yellow,
            ok: Color::Green,
            fail: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// The other variant.
    pub fn toggled(&self) -> Self {
        if self.light {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Style for a slot marker; unmarked slots render plain.
    pub fn marker_style(&self, marker: Option<Marker>) -> Style {
        match marker {
            None => Style::default(),
            Some(Marker::Positive) => Style::default().fg(self.positive),
            Some(Marker::Negative) => Style::default().fg(self.negative),
            Some(Marker::Error) => Style::default()
                .fg(self.error)
                .add_modifier(Modifier::ITALIC),
            Some(Marker::Warning) => Style::default().fg(self.warning).add_modifier(Modifier::BOLD),
            Some(Marker::Ok) => Style::default().fg(self.ok).add_modifier(Modifier::BOLD),
            Some(Marker::Fail) => Style::default().fg(self.fail).add_modifier(Modifier::BOLD),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
