//! Threat Module - Data Model & Risk Tiering
//!
//! Types mirror the telemetry backend's JSON payloads. Risk thresholds and
//! the alert cursor live in `risk` so the two never drift apart.

pub mod risk;
pub mod types;

pub use risk::{AlertCursor, RiskTier};
pub use types::{SyncSnapshot, ThreatEvent, ThreatStatus};
