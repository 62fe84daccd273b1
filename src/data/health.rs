//! Per-source connectivity health.
//!
//! Each polled source is either OK or FAIL. A source has no state (and no
//! badge) until its first cycle concludes; after that only the outcome of
//! its own cycles moves it.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::source::SourceKind;
use crate::ui::view::{Marker, View};

/// Connectivity state of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionHealth {
    Ok,
    Fail,
}

impl ConnectionHealth {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            ConnectionHealth::Ok => "OK",
            ConnectionHealth::Fail => "FAIL",
        }
    }

    fn marker(&self) -> Marker {
        match self {
            ConnectionHealth::Ok => Marker::Ok,
            ConnectionHealth::Fail => Marker::Fail,
        }
    }
}

/// Health slot name for a source, e.g. `health.metrics`.
pub fn health_slot(kind: SourceKind) -> String {
    format!("health.{}", kind.name())
}

/// Tracks the latest cycle outcome of every source.
#[derive(Debug, Clone, Default)]
pub struct HealthStatus {
    states: BTreeMap<SourceKind, ConnectionHealth>,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a source, `None` before its first cycle.
    pub fn get(&self, kind: SourceKind) -> Option<ConnectionHealth> {
        self.states.get(&kind).copied()
    }

    /// Record the outcome of a concluded cycle and update the badge.
    ///
    /// Returns the previous state.
    pub fn record<V: View + ?Sized>(
        &mut self,
        view: &mut V,
        kind: SourceKind,
        ok: bool,
    ) -> Option<ConnectionHealth> {
        let next = if ok {
            ConnectionHealth::Ok
        } else {
            ConnectionHealth::Fail
        };
        let previous = self.states.insert(kind, next);

        match (previous, next) {
            (Some(ConnectionHealth::Ok), ConnectionHealth::Fail) => {
                warn!("{} went from OK to FAIL", kind)
            }
            (Some(ConnectionHealth::Fail), ConnectionHealth::Ok) => info!("{} recovered", kind),
            (None, state) => info!("{} first cycle: {}", kind, state.symbol()),
            _ => {}
        }

        let slot = health_slot(kind);
        view.set_text(&slot, &format!("{}: {}", kind.name(), next.symbol()));
        view.set_marker(&slot, Some(next.marker()));

        previous
    }

    /// Sources that have reported at least once, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceKind, ConnectionHealth)> + '_ {
        self.states.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of sources currently failing.
    pub fn failing(&self) -> usize {
        self.states.values().filter(|s| **s == ConnectionHealth::Fail).count()
    }
}
