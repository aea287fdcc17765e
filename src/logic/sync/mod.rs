//! Sync Module - Backend Communication & Snapshot Publication
//!
//! This module handles:
//! - The HTTP client for the telemetry backend
//! - The recurring poll loop and snapshot publication
//! - Operator mutations (resolve, block) with optimistic patching

pub mod client;
pub mod engine;

pub use client::{HttpTelemetryClient, TelemetryApi};
pub use engine::{DashboardView, EngineConfig, SyncEngine};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// NOTICES
// ============================================================================

/// Category of a transient engine notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// A new critical threat arrived
    Critical,
    /// A mutation was accepted by the backend
    Success,
    /// A mutation was rejected
    Error,
    /// Transient fetch failure, retrying on the next cycle
    Warning,
}

/// Transient notification surfaced to the presentation layer.
///
/// One slot: a new notice overwrites the previous one, and the
/// presentation layer dismisses it explicitly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineNotice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl EngineNotice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Critical, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, message)
    }
}
