//! Threatboard Core - Headless Runner
//!
//! Wires the sync engine to the telemetry backend from the environment and
//! logs every published snapshot until Ctrl-C. The real presentation layer
//! consumes the same subscribe/read interface.

use std::sync::Arc;

use threatboard_core::{
    constants, ApiConfig, DashboardView, EngineConfig, HttpTelemetryClient, SyncEngine,
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting {} telemetry core v{}...",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let api_config = ApiConfig::default();
    log::info!("  Backend: {}", api_config.base_url);
    log::info!("  Poll interval: {}ms", constants::get_poll_interval_ms());

    let client = HttpTelemetryClient::new(api_config);
    match client.health_check().await {
        Ok(health) => log::info!("Backend healthy: {}", health.status),
        Err(e) => log::warn!("Backend not reachable yet: {} - will keep retrying", e),
    }

    let engine = SyncEngine::new(Arc::new(client), EngineConfig::default());
    let mut updates = engine.subscribe();
    engine.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                log_view(&view);
            }
        }
    }

    engine.stop();
    log::info!("Shutdown complete");
}

fn log_view(view: &DashboardView) {
    if let Some(alert) = &view.alert {
        log::info!("[{:?}] {}", alert.kind, alert.message);
    }

    log::info!(
        "Snapshot: {} threats, {} critical alerts, high-risk count {}",
        view.snapshot.threats.len(),
        view.snapshot.critical_alerts.len(),
        view.high_risk_count
    );
}
