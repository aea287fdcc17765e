//! Risk Tiering & Alert Cursor
//!
//! Threshold classification of backend risk scores and detection of
//! newly-arrived critical events across poll cycles. The thresholds here
//! are the single source of truth - summary buckets and per-row display
//! must both go through [`RiskTier::classify`].

use serde::{Deserialize, Serialize};

use super::types::{NamedCount, ThreatEvent};

// ============================================================================
// RISK TIER
// ============================================================================

/// Threshold-based classification of a 0-100 risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    /// score >= 80
    Critical,
    /// 60 <= score < 80
    High,
    /// 30 <= score < 60
    Medium,
    /// score < 30
    Low,
}

impl RiskTier {
    /// Classify a backend risk score. Total over all inputs.
    pub fn classify(score: f64) -> RiskTier {
        if score >= 80.0 {
            RiskTier::Critical
        } else if score >= 60.0 {
            RiskTier::High
        } else if score >= 30.0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Critical => "Critical",
            RiskTier::High => "High",
            RiskTier::Medium => "Medium",
            RiskTier::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sum of the Critical and High bucket values; 0 when either is absent.
pub fn high_risk_count(risk_summary: &[NamedCount]) -> u64 {
    risk_summary
        .iter()
        .filter(|b| b.name == RiskTier::Critical.as_str() || b.name == RiskTier::High.as_str())
        .map(|b| b.value)
        .sum()
}

// ============================================================================
// ALERT CURSOR
// ============================================================================

/// Marker over the most recently seen "newest" threat.
///
/// Owned by the engine instance and threaded through detection explicitly,
/// so independent engines never cross-contaminate. Not persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertCursor {
    last_seen: Option<String>,
}

impl AlertCursor {
    /// Sentinel "none seen" cursor
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }
}

/// Evaluate a snapshot's newest threat against the cursor.
///
/// The cursor is replaced only when the newest timestamp differs from the
/// remembered one; the event is returned only when the timestamp changed
/// AND the score classifies as Critical. Each distinct newest-event
/// transition is therefore evaluated exactly once, even across failed
/// cycles in between.
///
/// Timestamp equality is the sole dedup key: two distinct critical events
/// sharing a timestamp alert only once. Known fragility, kept as-is.
pub fn detect_new_critical<'a>(
    threats: &'a [ThreatEvent],
    cursor: &AlertCursor,
) -> (AlertCursor, Option<&'a ThreatEvent>) {
    let Some(newest) = threats.first() else {
        return (cursor.clone(), None);
    };

    if cursor.last_seen() == Some(newest.timestamp.as_str()) {
        return (cursor.clone(), None);
    }

    let updated = AlertCursor {
        last_seen: Some(newest.timestamp.clone()),
    };

    if RiskTier::classify(newest.risk_score) == RiskTier::Critical {
        (updated, Some(newest))
    } else {
        (updated, None)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::threat::types::ThreatStatus;

    fn event(timestamp: &str, risk_score: f64) -> ThreatEvent {
        ThreatEvent {
            id: format!("id-{timestamp}-{risk_score}"),
            timestamp: timestamp.to_string(),
            source_ip: "203.0.113.7".to_string(),
            dest_ip: "10.0.0.12".to_string(),
            predicted_label: "DDoS".to_string(),
            confidence: 0.9,
            risk_score,
            status: ThreatStatus::Active,
            escalation_flag: false,
            destination_port: None,
            protocol: None,
            packet_size: None,
        }
    }

    #[test]
    fn test_classify_tier_boundaries() {
        assert_eq!(RiskTier::classify(80.0), RiskTier::Critical);
        assert_eq!(RiskTier::classify(79.0), RiskTier::High);
        assert_eq!(RiskTier::classify(60.0), RiskTier::High);
        assert_eq!(RiskTier::classify(59.0), RiskTier::Medium);
        assert_eq!(RiskTier::classify(30.0), RiskTier::Medium);
        assert_eq!(RiskTier::classify(29.0), RiskTier::Low);
        assert_eq!(RiskTier::classify(0.0), RiskTier::Low);
        assert_eq!(RiskTier::classify(100.0), RiskTier::Critical);
        // Out-of-range inputs still classify
        assert_eq!(RiskTier::classify(-5.0), RiskTier::Low);
        assert_eq!(RiskTier::classify(120.0), RiskTier::Critical);
    }

    #[test]
    fn test_high_risk_count_sums_critical_and_high() {
        let summary = vec![
            NamedCount { name: "Critical".to_string(), value: 3 },
            NamedCount { name: "High".to_string(), value: 5 },
            NamedCount { name: "Medium".to_string(), value: 2 },
        ];
        assert_eq!(high_risk_count(&summary), 8);
    }

    #[test]
    fn test_high_risk_count_empty_summary() {
        assert_eq!(high_risk_count(&[]), 0);
    }

    #[test]
    fn test_high_risk_count_missing_buckets() {
        let summary = vec![NamedCount { name: "Low".to_string(), value: 12 }];
        assert_eq!(high_risk_count(&summary), 0);
    }

    #[test]
    fn test_first_critical_raises_alert() {
        let threats = vec![event("2026-08-23 10:00:00", 90.0)];
        let (cursor, hit) = detect_new_critical(&threats, &AlertCursor::new());
        assert!(hit.is_some());
        assert_eq!(cursor.last_seen(), Some("2026-08-23 10:00:00"));
    }

    #[test]
    fn test_repeated_timestamp_does_not_realert() {
        // Newest timestamps [T1, T1, T2] with scores [90, 90, 10]:
        // exactly one alert, at the first T1 transition.
        let mut cursor = AlertCursor::new();
        let mut alerts = 0;

        for (ts, score) in [
            ("2026-08-23 10:00:00", 90.0),
            ("2026-08-23 10:00:00", 90.0),
            ("2026-08-23 10:05:00", 10.0),
        ] {
            let threats = vec![event(ts, score)];
            let (next, hit) = detect_new_critical(&threats, &cursor);
            cursor = next;
            if hit.is_some() {
                alerts += 1;
            }
        }

        assert_eq!(alerts, 1);
        // Cursor still advanced at T2 even though no alert was raised
        assert_eq!(cursor.last_seen(), Some("2026-08-23 10:05:00"));
    }

    #[test]
    fn test_same_timestamp_different_content_is_silent() {
        let first = vec![event("2026-08-23 11:00:00", 95.0)];
        let (cursor, hit) = detect_new_critical(&first, &AlertCursor::new());
        assert!(hit.is_some());

        // Same newest timestamp, different event body: dedup key matches,
        // no second alert.
        let mut other = event("2026-08-23 11:00:00", 99.0);
        other.id = "different".to_string();
        let others = [other];
        let (cursor2, hit2) = detect_new_critical(&others, &cursor);
        assert!(hit2.is_none());
        assert_eq!(cursor2, cursor);
    }

    #[test]
    fn test_empty_threats_keeps_cursor() {
        let seeded = {
            let threats = vec![event("2026-08-23 09:00:00", 50.0)];
            detect_new_critical(&threats, &AlertCursor::new()).0
        };

        let (cursor, hit) = detect_new_critical(&[], &seeded);
        assert!(hit.is_none());
        assert_eq!(cursor, seeded);
    }
}
