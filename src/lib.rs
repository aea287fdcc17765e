//! Threatboard Core - Telemetry Sync & Alert Escalation Engine
//!
//! The stateful core of the security-operations dashboard: polls the
//! telemetry backend, publishes consistent snapshots, classifies risk and
//! raises critical-alert notices. The presentation layer (external) reads
//! the published [`DashboardView`] and calls the mutation operations.

pub mod constants;
pub mod logic;

pub use logic::sync::client::{ApiConfig, ApiError, HealthStatus, HttpTelemetryClient, TelemetryApi};
pub use logic::sync::engine::{ActivityGate, DashboardView, EngineConfig, SyncEngine};
pub use logic::sync::{EngineNotice, NoticeKind};
pub use logic::threat::risk::{detect_new_critical, high_risk_count, AlertCursor, RiskTier};
pub use logic::threat::types::{
    FeatureWeight, HistoryPoint, ModelMetrics, NamedCount, SyncSnapshot, ThreatEvent,
    ThreatStatus,
};
