//! Sync Engine
//!
//! Owns the recurring poll cycle against the telemetry backend and
//! publishes one consistent [`DashboardView`] per successful cycle.
//! Operator mutations (resolve, block) patch the published state
//! optimistically; the next successful poll is authoritative
//! ("last publish wins"), unless pending-resolve reapplication is enabled.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::client::{ApiError, TelemetryApi};
use super::EngineNotice;
use crate::constants;
use crate::logic::threat::risk::{self, AlertCursor};
use crate::logic::threat::types::{SyncSnapshot, ThreatStatus};

/// Best-effort "is the dashboard visible" check; cycles are skipped while
/// it returns false. Cost saving only, never a correctness requirement.
pub type ActivityGate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Engine configuration
#[derive(Clone)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub activity_gate: Option<ActivityGate>,
    /// When enabled, locally resolved threats are re-applied onto each new
    /// snapshot until the backend confirms them, instead of being
    /// transiently reverted by a stale poll.
    pub reapply_pending_resolves: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(constants::get_poll_interval_ms()),
            activity_gate: None,
            reapply_pending_resolves: false,
        }
    }
}

/// Published engine state, read by the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub snapshot: SyncSnapshot,
    pub high_risk_count: u64,
    /// True until the first cycle completes (success or failure)
    pub loading: bool,
    pub alert: Option<EngineNotice>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            snapshot: SyncSnapshot::default(),
            high_risk_count: 0,
            loading: true,
            alert: None,
        }
    }
}

/// Clears the single-in-flight flag when the fetch future completes or is
/// cancelled at its await point.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Telemetry synchronization and alert-escalation engine.
///
/// One instance per dashboard; all cross-cycle state (cursor, pending
/// patches, in-flight guard) is owned here, never ambient.
pub struct SyncEngine {
    api: Arc<dyn TelemetryApi>,
    config: EngineConfig,
    state: watch::Sender<DashboardView>,
    cursor: Mutex<AlertCursor>,
    pending_resolves: Mutex<HashSet<String>>,
    fetch_in_flight: AtomicBool,
    active: AtomicBool,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn TelemetryApi>, config: EngineConfig) -> Arc<Self> {
        let (state, _) = watch::channel(DashboardView::default());

        Arc::new(Self {
            api,
            config,
            state,
            cursor: Mutex::new(AlertCursor::new()),
            pending_resolves: Mutex::new(HashSet::new()),
            fetch_in_flight: AtomicBool::new(false),
            active: AtomicBool::new(true),
            poll_task: Mutex::new(None),
        })
    }

    /// Begin the recurring poll cycle: one immediate fetch, then one per
    /// interval. Missed ticks are dropped, not replayed. No-op if already
    /// started.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.poll_task.lock();
        if task.is_some() {
            log::debug!("Sync loop already running");
            return;
        }

        self.active.store(true, Ordering::SeqCst);

        let engine = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            log::info!(
                "Telemetry sync loop started (interval: {:?})",
                engine.config.poll_interval
            );

            let mut ticker = tokio::time::interval(engine.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                engine.poll_once().await;
            }
        }));
    }

    /// Cancel the recurring cycle. Idempotent; safe when never started.
    /// A fetch already in flight cannot be retracted, but its late
    /// completion is discarded.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);

        if let Some(handle) = self.poll_task.lock().take() {
            handle.abort();
            log::info!("Telemetry sync loop stopped");
        }
    }

    /// Run a single fetch-and-publish cycle (also usable as a manual
    /// refresh). Skipped while the activity gate is closed or a previous
    /// fetch is still in flight.
    pub async fn poll_once(&self) {
        if let Some(gate) = &self.config.activity_gate {
            if !gate() {
                log::debug!("Dashboard inactive, skipping poll cycle");
                return;
            }
        }

        // At most one fetch in flight; overlapping triggers are dropped.
        if self
            .fetch_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Previous fetch still in flight, dropping trigger");
            return;
        }

        // The guard clears the flag on drop, so a fetch cancelled mid-await
        // (stop() aborting the poll task) cannot leave it stuck on true.
        let result = {
            let _in_flight = InFlightGuard(&self.fetch_in_flight);
            self.api.fetch_snapshot().await
        };

        if !self.active.load(Ordering::SeqCst) {
            log::debug!("Engine stopped while fetch was in flight, discarding response");
            return;
        }

        match result {
            Ok(snapshot) => self.publish(snapshot),
            Err(e) => {
                log::warn!("Poll cycle failed: {}", e);
                self.state.send_modify(|view| {
                    view.loading = false;
                    view.alert = Some(EngineNotice::warning(
                        "Connection to telemetry backend lost, retrying...",
                    ));
                });
            }
        }
    }

    /// Publish a freshly fetched snapshot, replacing the previous one
    /// wholesale, and raise a critical notice on a new newest-event
    /// transition.
    fn publish(&self, mut snapshot: SyncSnapshot) {
        if self.config.reapply_pending_resolves {
            self.reapply_pending(&mut snapshot);
        }

        let notice = {
            let mut cursor = self.cursor.lock();
            let (next, hit) = risk::detect_new_critical(&snapshot.threats, &cursor);
            *cursor = next;

            hit.map(|t| {
                log::warn!(
                    "New critical threat: {} from {} (risk {:.0})",
                    t.predicted_label,
                    t.source_ip,
                    t.risk_score
                );
                EngineNotice::critical(format!(
                    "New critical threat: {} from {}",
                    t.predicted_label, t.source_ip
                ))
            })
        };

        let high_risk_count = risk::high_risk_count(&snapshot.risk_summary);

        self.state.send_modify(|view| {
            view.snapshot = snapshot;
            view.high_risk_count = high_risk_count;
            view.loading = false;
            if let Some(n) = notice {
                view.alert = Some(n);
            }
        });
    }

    /// Re-apply unconfirmed local resolves onto a new snapshot; drop the
    /// ones the backend now reflects (or no longer serves).
    fn reapply_pending(&self, snapshot: &mut SyncSnapshot) {
        let mut pending = self.pending_resolves.lock();
        if pending.is_empty() {
            return;
        }

        pending.retain(|id| match snapshot.threats.iter_mut().find(|t| &t.id == id) {
            Some(t) if t.status == ThreatStatus::Resolved => false,
            Some(t) => {
                t.status = ThreatStatus::Resolved;
                snapshot.critical_alerts.retain(|c| &c.id != id);
                true
            }
            None => false,
        });
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Resolve an incident. On acceptance the local snapshot is patched
    /// ahead of the next poll; on failure state is left untouched.
    /// Resolving an already-resolved threat is a no-op, not an error.
    pub async fn resolve(&self, threat_id: &str) -> Result<(), ApiError> {
        match self.api.resolve_threat(threat_id).await {
            Ok(()) => {
                if self.config.reapply_pending_resolves {
                    self.pending_resolves.lock().insert(threat_id.to_string());
                }

                self.state.send_modify(|view| {
                    if let Some(t) = view.snapshot.threats.iter_mut().find(|t| t.id == threat_id)
                    {
                        t.status = ThreatStatus::Resolved;
                    }
                    view.snapshot.critical_alerts.retain(|t| t.id != threat_id);
                    view.alert = Some(EngineNotice::success(format!(
                        "Threat {} marked as resolved",
                        threat_id
                    )));
                });

                log::info!("Threat {} resolved", threat_id);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to resolve threat {}: {}", threat_id, e);
                self.state.send_modify(|view| {
                    view.alert = Some(EngineNotice::error(format!(
                        "Failed to resolve threat {}: {}",
                        threat_id, e
                    )));
                });
                Err(e)
            }
        }
    }

    /// Block the source of an incident at the network layer. No local
    /// threat state changes; the IP is carried for the notice only.
    pub async fn block(&self, threat_id: &str, source_ip: &str) -> Result<(), ApiError> {
        match self.api.block_threat(threat_id).await {
            Ok(()) => {
                self.state.send_modify(|view| {
                    view.alert = Some(EngineNotice::success(format!(
                        "Source {} has been blocked at the firewall",
                        source_ip
                    )));
                });

                log::info!("Blocked source {} (threat {})", source_ip, threat_id);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to block {}: {}", source_ip, e);
                self.state.send_modify(|view| {
                    view.alert = Some(EngineNotice::error(format!(
                        "Failed to block {}: {}",
                        source_ip, e
                    )));
                });
                Err(e)
            }
        }
    }

    /// Clear the transient notice slot
    pub fn dismiss_alert(&self) {
        self.state.send_modify(|view| view.alert = None);
    }

    // ------------------------------------------------------------------
    // Read interface
    // ------------------------------------------------------------------

    /// Current published state
    pub fn view(&self) -> DashboardView {
        self.state.borrow().clone()
    }

    /// Subscribe to published state changes
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.state.subscribe()
    }
}

// ============================================================================
// TESTS
// ============================================================================
