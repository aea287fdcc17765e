//! Logic Module - Engine Internals
//!
//! - `threat/` - Wire data model, risk tiering, alert cursor
//! - `sync/` - Telemetry client and the synchronization engine

pub mod sync;
pub mod threat;
