//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default telemetry backend, only edit this file.

/// Default telemetry API base URL
///
/// This is the fallback URL when no environment variable is set.
/// For development: http://localhost:8000
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default poll interval (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Default HTTP request timeout (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Threatboard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get telemetry API base URL from environment or use default
pub fn get_api_url() -> String {
    std::env::var("THREAT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Get poll interval from environment or use default
pub fn get_poll_interval_ms() -> u64 {
    std::env::var("POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
}

/// Get HTTP request timeout from environment or use default
pub fn get_api_timeout_secs() -> u64 {
    std::env::var("API_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_API_TIMEOUT_SECS)
}
