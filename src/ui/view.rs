//! Named display slots.
//!
//! The renderer and the health tracker never draw directly. They write text,
//! rows and style markers into named slots through the [`View`] trait. The
//! TUI draws from a [`Surface`], and tests assert on one.

use std::collections::BTreeMap;

use serde::Serialize;

/// Style marker attached to a slot or a table cell.
///
/// A slot carries at most one marker, so `Positive`/`Negative` and `Ok`/`Fail`
/// are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Positive,
    Negative,
    Error,
    /// Close to a limit but not past it.
    Warning,
    Ok,
    Fail,
}

impl Marker {
    /// Marker for a sign-sensitive value; missing counts as zero.
    pub fn for_sign(value: Option<f64>) -> Self {
        if value.filter(|v| v.is_finite()).unwrap_or(0.0) < 0.0 {
            Marker::Negative
        } else {
            Marker::Positive
        }
    }
}

/// One cell of a table slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marker: None,
        }
    }

    pub fn marked(text: impl Into<String>, marker: Marker) -> Self {
        Self {
            text: text.into(),
            marker: Some(marker),
        }
    }
}

/// What a slot currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotContent {
    Text(String),
    Rows(Vec<Vec<Cell>>),
}

impl Default for SlotContent {
    fn default() -> Self {
        SlotContent::Text(String::new())
    }
}

/// A named display slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Slot {
    pub content: SlotContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// Write access to named display slots.
pub trait View {
    /// Replace a slot's content with text.
    fn set_text(&mut self, slot: &str, text: &str);

    /// Replace a slot's content with table rows.
    fn set_rows(&mut self, slot: &str, rows: Vec<Vec<Cell>>);

    /// Set or clear the slot's marker, replacing any previous one.
    fn set_marker(&mut self, slot: &str, marker: Option<Marker>);
}

/// In-memory display surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Surface {
    slots: BTreeMap<String, Slot>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Text of a text slot.
    pub fn text(&self, name: &str) -> Option<&str> {
        match &self.slot(name)?.content {
            SlotContent::Text(text) => Some(text),
            SlotContent::Rows(_) => None,
        }
    }

    /// Rows of a table slot.
    pub fn rows(&self, name: &str) -> Option<&[Vec<Cell>]> {
        match &self.slot(name)?.content {
            SlotContent::Rows(rows) => Some(rows),
            SlotContent::Text(_) => None,
        }
    }

    pub fn marker(&self, name: &str) -> Option<Marker> {
        self.slot(name)?.marker
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot names with a given prefix, e.g. `"health."`.
    pub fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.slots.keys().map(String::as_str).filter(move |k| k.starts_with(prefix))
    }

    fn entry(&mut self, name: &str) -> &mut Slot {
        self.slots.entry(name.to_string()).or_default()
    }
}

impl View for Surface {
    fn set_text(&mut self, slot: &str, text: &str) {
        self.entry(slot).content = SlotContent::Text(text.to_string());
    }

    fn set_rows(&mut self, slot: &str, rows: Vec<Vec<Cell>>) {
        self.entry(slot).content = SlotContent::Rows(rows);
    }

    fn set_marker(&mut self, slot: &str, marker: Option<Marker>) {
        self.entry(slot).marker = marker;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_for_sign() {
        assert_eq!(Marker::for_sign(Some(12.5)), Marker::Positive);
        assert_eq!(Marker::for_sign(Some(-0.01)), Marker::Negative);
        assert_eq!(Marker::for_sign(Some(0.0)), Marker::Positive);
        assert_eq!(Marker::for_sign(None), Marker::Positive);
        assert_eq!(Marker::for_sign(Some(f64::NAN)), Marker::Positive);
    }

    #[test]
    fn test_surface_text_and_marker() {
        let mut surface = Surface::new();
        assert!(surface.is_empty());

        surface.set_text("balance.total", "$1.00");
        surface.set_marker("balance.total", Some(Marker::Error));
        assert_eq!(surface.text("balance.total"), Some("$1.00"));
        assert_eq!(surface.marker("balance.total"), Some(Marker::Error));

        surface.set_marker("balance.total", None);
        assert_eq!(surface.marker("balance.total"), None);
        assert_eq!(surface.text("balance.total"), Some("$1.00"));
    }

    #[test]
    fn test_surface_rows_replace_text() {
        let mut surface = Surface::new();
        surface.set_text("positions", "No active positions");
        surface.set_rows("positions", vec![vec![Cell::plain("BTCUSDT")]]);

        assert_eq!(surface.text("positions"), None);
        assert_eq!(surface.rows("positions").unwrap().len(), 1);
    }

    #[test]
    fn test_names_with_prefix() {
        let mut surface = Surface::new();
        surface.set_text("health.balance", "balance: OK");
        surface.set_text("health.metrics", "metrics: FAIL");
        surface.set_text("metrics.equity", "10,000");

        let names: Vec<_> = surface.names_with_prefix("health.").collect();
        assert_eq!(names, ["health.balance", "health.metrics"]);
    }

    #[test]
    fn test_surface_serializes_to_json() {
        let mut surface = Surface::new();
        surface.set_text("metrics.pnl_total", "12.5");
        surface.set_marker("metrics.pnl_total", Some(Marker::Positive));

        let json = serde_json::to_value(&surface).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "metrics.pnl_total": { "content": { "text": "12.5" }, "marker": "positive" }
            })
        );
    }
}
