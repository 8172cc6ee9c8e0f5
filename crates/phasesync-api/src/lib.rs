//! # phasesync-api
//!
//! Abstraction over the project-tracking backend used by the PhaseSync
//! reconciler.
//!
//! This crate defines the [`TrackerApi`] trait and its error type. It does not
//! contain any implementations; `phasesync-http` talks to the real REST
//! backend and `phasesync-memory` keeps everything in process.
//!
//! ## Example
//!
//! ```ignore
//! use phasesync_api::{DynTrackerApi, PhaseType};
//!
//! async fn find_scrum_phase(api: DynTrackerApi) -> Option<String> {
//!     let phases = api.list_phases().await.ok()?;
//!     phases
//!         .into_iter()
//!         .find(|p| p.phase_type == PhaseType::Scrum)
//!         .map(|p| p.id)
//! }
//! ```

mod error;
mod traits;

pub use error::{ApiError, ErrorCategory};
pub use traits::TrackerApi;

pub use phasesync_core::{
    DeliverableChanges, NewDeliverable, NewPhase, PersistedDeliverable, PersistedPhase,
    PhaseChanges, PhaseDetail, PhaseType,
};

/// Type alias for an API call result.
pub type ApiResult<T> = Result<T, ApiError>;

/// Type alias for a shareable tracker trait object.
pub type DynTrackerApi = std::sync::Arc<dyn TrackerApi>;
