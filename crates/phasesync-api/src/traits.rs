//! The remote operations the reconciler is allowed to use.

use async_trait::async_trait;
use phasesync_core::{
    DeliverableChanges, NewDeliverable, NewPhase, PersistedDeliverable, PersistedPhase,
    PhaseChanges, PhaseDetail,
};

use crate::error::ApiError;

/// Generic CRUD surface of the project-tracking backend.
///
/// There is deliberately no batch or transactional operation here: every
/// call stands alone, and a sequence of calls can be interrupted at any
/// point. Implementations must be thread-safe (`Send + Sync`) because the
/// reconciler fans calls out concurrently.
///
/// # Example
///
/// ```ignore
/// use phasesync_api::{ApiError, TrackerApi};
///
/// async fn active_deliverables(api: &dyn TrackerApi, phase_id: &str) -> Result<usize, ApiError> {
///     Ok(api.get_phase_detail(phase_id).await?.deliverables.len())
/// }
/// ```
#[async_trait]
pub trait TrackerApi: Send + Sync {
    // ==================== Phases ====================

    /// Lists every phase visible to the caller, across projects.
    async fn list_phases(&self) -> Result<Vec<PersistedPhase>, ApiError>;

    /// Creates a phase.
    async fn create_phase(&self, phase: &NewPhase) -> Result<PersistedPhase, ApiError>;

    /// Updates the core fields of a phase.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the phase does not exist.
    async fn update_phase(
        &self,
        id: &str,
        changes: &PhaseChanges,
    ) -> Result<PersistedPhase, ApiError>;

    /// Reads a phase together with its non-deleted deliverables.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the phase does not exist.
    async fn get_phase_detail(&self, id: &str) -> Result<PhaseDetail, ApiError>;

    // ==================== Deliverables ====================

    /// Creates a deliverable under a phase.
    async fn create_deliverable(
        &self,
        deliverable: &NewDeliverable,
    ) -> Result<PersistedDeliverable, ApiError>;

    /// Updates a deliverable in place.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the deliverable does not exist or was soft-deleted.
    async fn update_deliverable(
        &self,
        id: &str,
        changes: &DeliverableChanges,
    ) -> Result<PersistedDeliverable, ApiError>;

    /// Soft-deletes a deliverable.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the deliverable is already deleted or never existed.
    async fn delete_deliverable(&self, id: &str) -> Result<(), ApiError>;

    // ==================== Metadata ====================

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}
