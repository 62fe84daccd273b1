//! Data models for the polled endpoints.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of interval strings (e.g., "2s", "500ms")
//! - [`health`]: Per-source OK/FAIL tracking ([`HealthStatus`], [`ConnectionHealth`])
//! - [`snapshot`]: Response models ([`BalanceSnapshot`], [`Position`], [`MetricsSnapshot`],
//!   [`ExecutorSettings`], [`RiskSnapshot`]) and body decoding
//!
//! ## Data Flow
//!
//! ```text
//! response body (JSON)
//!        │
//!        ▼
//! Snapshot::decode(kind, body)
//!        │
//!        ├──▶ ui::render (slots)
//!        │
//!        └──▶ HealthStatus::record (badge)
//! ```

pub mod duration;
pub mod health;
pub mod snapshot;

pub use health::{health_slot, ConnectionHealth, HealthStatus};
pub use snapshot::{
    BalanceSnapshot, ExecutorSettings, MetricsSnapshot, Position, RiskSnapshot, Snapshot,
};
