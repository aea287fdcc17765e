//! Telemetry API Client
//!
//! HTTP client for the threat-detection backend. The engine talks to the
//! backend through the [`TelemetryApi`] trait, so tests can swap in a mock
//! transport and drive cycles deterministically.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::constants;
use crate::logic::threat::types::{
    FeatureWeight, HistoryPoint, ModelMetrics, NamedCount, SyncSnapshot, ThreatEvent,
};

/// Telemetry client errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error: {0}")]
    Server(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Transport seam between the engine and the backend.
///
/// One fetch returns the full merged snapshot; partial results never leave
/// the client.
#[async_trait]
pub trait TelemetryApi: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<SyncSnapshot, ApiError>;
    async fn resolve_threat(&self, threat_id: &str) -> Result<(), ApiError>;
    async fn block_threat(&self, threat_id: &str) -> Result<(), ApiError>;
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// Telemetry backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::get_api_url(),
            timeout_seconds: constants::get_api_timeout_secs(),
        }
    }
}

/// Diagnostic heartbeat payload from the backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// reqwest-backed client against the dashboard REST API
pub struct HttpTelemetryClient {
    config: ApiConfig,
    http_client: reqwest::Client,
}

impl HttpTelemetryClient {
    pub fn new(config: ApiConfig) -> Self {
        let http_client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                log::warn!(
                    "Failed to build HTTP client with {}s timeout: {} - falling back to defaults",
                    config.timeout_seconds,
                    e
                );
                reqwest::Client::new()
            }
        };

        Self { config, http_client }
    }

    /// Check backend health (used by the runner at startup)
    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/api/health").await
    }

    /// GET a JSON endpoint relative to the base URL
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::Parse(e.to_string()))
        } else {
            Err(ApiError::Server(response.status().as_u16()))
        }
    }

    /// POST to an action endpoint, discarding the response body
    async fn post_action(&self, path: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .http_client
            .post(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Server(response.status().as_u16()))
        }
    }
}

#[async_trait]
impl TelemetryApi for HttpTelemetryClient {
    /// Fetch all dashboard views concurrently and merge them.
    ///
    /// All-or-nothing: if any sub-fetch fails the cycle fails as a whole
    /// and the engine keeps the last-good snapshot.
    async fn fetch_snapshot(&self) -> Result<SyncSnapshot, ApiError> {
        let (threats, risk_summary, metrics, history, features, attack_types, critical_alerts) =
            tokio::try_join!(
                self.get_json::<Vec<ThreatEvent>>("/api/threats"),
                self.get_json::<Vec<NamedCount>>("/api/threats/risk-summary"),
                self.get_json::<ModelMetrics>("/api/model/metrics"),
                self.get_json::<Vec<HistoryPoint>>("/api/stats/history"),
                self.get_json::<Vec<FeatureWeight>>("/api/model/features"),
                self.get_json::<Vec<NamedCount>>("/api/stats/attack-types"),
                self.get_json::<Vec<ThreatEvent>>("/api/alerts/critical"),
            )?;

        Ok(SyncSnapshot {
            threats,
            risk_summary,
            metrics,
            history,
            features,
            attack_types,
            critical_alerts,
        })
    }

    async fn resolve_threat(&self, threat_id: &str) -> Result<(), ApiError> {
        log::debug!("Resolving threat {}", threat_id);
        self.post_action(&format!("/api/threats/{}/resolve", threat_id))
            .await
    }

    async fn block_threat(&self, threat_id: &str) -> Result<(), ApiError> {
        log::debug!("Blocking source of threat {}", threat_id);
        self.post_action(&format!("/api/threats/{}/block", threat_id))
            .await
    }
}
