//! Threat Types
//!
//! Wire data model for the telemetry backend. No logic here - only data
//! structures. Every collection and optional scalar carries a serde default
//! so a partial payload never brings the engine down.

use serde::{Deserialize, Serialize};

// ============================================================================
// THREAT EVENT
// ============================================================================

/// Lifecycle state of a detected threat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThreatStatus {
    /// Unresolved, shown in the live feed
    #[default]
    Active,
    /// Triaged by an operator; transition is one-way
    Resolved,
}

impl ThreatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatStatus::Active => "Active",
            ThreatStatus::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for ThreatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected and classified network event
///
/// `timestamp` is the backend's local-time text ("YYYY-MM-DD HH:MM:SS").
/// The engine only ever compares it for equality, so it stays opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatEvent {
    pub id: String,
    pub timestamp: String,
    pub source_ip: String,
    #[serde(rename = "destination_ip", default)]
    pub dest_ip: String,
    pub predicted_label: String,
    /// Model probability output (0.0 - 1.0)
    #[serde(default)]
    pub confidence: f64,
    /// Backend-computed risk score (0 - 100). The scorer emits floats
    /// (escalation multiplies by 1.2 and clamps at 100.0).
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub status: ThreatStatus,
    /// Repeat-offender marker set by the backend's temporal analysis
    #[serde(default)]
    pub escalation_flag: bool,
    #[serde(default)]
    pub destination_port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub packet_size: Option<u64>,
}

impl ThreatEvent {
    pub fn is_active(&self) -> bool {
        self.status == ThreatStatus::Active
    }
}

// ============================================================================
// AGGREGATES
// ============================================================================

/// Named count, used for risk-summary buckets and attack-type distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: u64,
}

/// ML model performance metrics
///
/// The backend returns an error object when the metrics artifact is missing;
/// all-optional fields let that deserialize into an empty struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub f1_score: Option<f64>,
}

/// One point of the threat-volume trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub time: String,
    pub count: u64,
}

/// Feature importance ranking from the model explainability export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    #[serde(default, alias = "name")]
    pub feature: String,
    #[serde(default)]
    pub importance: f64,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// One complete, internally consistent set of telemetry fields.
///
/// Recreated wholesale every successful poll cycle; the only in-place
/// mutation path is the optimistic resolve patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    /// Newest first, as served by the backend
    #[serde(default)]
    pub threats: Vec<ThreatEvent>,
    #[serde(default)]
    pub risk_summary: Vec<NamedCount>,
    #[serde(default)]
    pub metrics: ModelMetrics,
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
    #[serde(default)]
    pub features: Vec<FeatureWeight>,
    #[serde(default)]
    pub attack_types: Vec<NamedCount>,
    /// Most recent unresolved critical threats (backend serves top 3)
    #[serde(default)]
    pub critical_alerts: Vec<ThreatEvent>,
}

// ============================================================================
// TESTS
// ============================================================================
