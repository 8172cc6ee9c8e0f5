//! In-memory tracker backend for PhaseSync.
//!
//! This crate provides an in-process implementation of the `TrackerApi` trait
//! from `phasesync-api`, using dashmap for concurrent access. It reproduces
//! the soft-delete behavior of the real backend and journals every call, so
//! reconciliation runs can be asserted on call-by-call.
//!
//! # Example
//!
//! ```ignore
//! use phasesync_memory::InMemoryTracker;
//! use phasesync_api::{PhaseType, TrackerApi};
//!
//! let tracker = InMemoryTracker::new();
//! let phase = tracker.insert_phase(Some("proj-1"), PhaseType::Scrum, "Development");
//! tracker.insert_deliverable(&phase.id, "Sprint 1 Code", Some("2025-02-15T00:00:00Z"));
//!
//! let detail = tracker.get_phase_detail(&phase.id).await?;
//! ```

pub mod journal;
pub mod storage;
mod tracker_impl;

pub use journal::{ApiOperation, RecordedCall};
pub use storage::InMemoryTracker;

// Re-export the TrackerApi trait for convenience
pub use phasesync_api::{ApiError, TrackerApi};

/// Creates a new shareable in-memory tracker.
pub fn create_tracker() -> std::sync::Arc<InMemoryTracker> {
    std::sync::Arc::new(InMemoryTracker::new())
}
