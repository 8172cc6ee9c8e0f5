use dashmap::DashMap;
use phasesync_api::ApiError;
use phasesync_core::{DeliverableStatus, PersistedDeliverable, PersistedPhase, PhaseType};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;

use crate::journal::{ApiOperation, Fault, RecordedCall};

/// In-memory tracker backend.
///
/// Mirrors the server behavior the reconciler relies on:
/// - deliverable deletes are soft (`deletedAt` is stamped)
/// - detail views only return non-deleted deliverables
/// - deleting or updating a soft-deleted deliverable is a not-found
///
/// Every call is appended to a journal before it runs, and failures can be
/// injected per operation.
#[derive(Debug, Default)]
pub struct InMemoryTracker {
    pub(crate) phases: DashMap<String, PersistedPhase>,
    pub(crate) deliverables: DashMap<String, PersistedDeliverable>,
    journal: RwLock<Vec<RecordedCall>>,
    faults: RwLock<Vec<Fault>>,
}

impl InMemoryTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub(crate) fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    pub(crate) fn now_rfc3339() -> String {
        Self::now().format(&Rfc3339).unwrap_or_default()
    }

    // ==================== Seeding ====================

    /// Stores a phase as-is, replacing any phase with the same id.
    pub fn seed_phase(&self, phase: PersistedPhase) {
        self.phases.insert(phase.id.clone(), phase);
    }

    /// Stores a new phase and returns it.
    pub fn insert_phase(
        &self,
        project_id: Option<&str>,
        phase_type: PhaseType,
        name: &str,
    ) -> PersistedPhase {
        let now = Self::now();
        let phase = PersistedPhase {
            id: Self::generate_id(),
            project_id: project_id.map(str::to_string),
            phase_type,
            name: name.to_string(),
            description: None,
            start_date: None,
            end_date: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.seed_phase(phase.clone());
        phase
    }

    /// Stores a deliverable as-is, replacing any deliverable with the same id.
    pub fn seed_deliverable(&self, deliverable: PersistedDeliverable) {
        self.deliverables
            .insert(deliverable.id.clone(), deliverable);
    }

    /// Stores a new pending deliverable under `phase_id` and returns it.
    pub fn insert_deliverable(
        &self,
        phase_id: &str,
        title: &str,
        due_date: Option<&str>,
    ) -> PersistedDeliverable {
        let deliverable = PersistedDeliverable {
            id: Self::generate_id(),
            phase_id: phase_id.to_string(),
            title: title.to_string(),
            description: None,
            status: DeliverableStatus::Pending,
            due_date: due_date.map(str::to_string),
            deleted_at: None,
        };
        self.seed_deliverable(deliverable.clone());
        deliverable
    }

    // ==================== Inspection ====================

    pub fn phase(&self, id: &str) -> Option<PersistedPhase> {
        self.phases.get(id).map(|entry| entry.value().clone())
    }

    /// All phases, ordered by name then id.
    pub fn phases(&self) -> Vec<PersistedPhase> {
        let mut phases: Vec<PersistedPhase> =
            self.phases.iter().map(|entry| entry.value().clone()).collect();
        phases.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        phases
    }

    /// Any deliverable by id, including soft-deleted ones.
    pub fn deliverable(&self, id: &str) -> Option<PersistedDeliverable> {
        self.deliverables.get(id).map(|entry| entry.value().clone())
    }

    /// Non-deleted deliverables of a phase, ordered by title then id.
    pub fn active_deliverables(&self, phase_id: &str) -> Vec<PersistedDeliverable> {
        let mut active: Vec<PersistedDeliverable> = self
            .deliverables
            .iter()
            .filter(|entry| entry.phase_id == phase_id && entry.deleted_at.is_none())
            .map(|entry| entry.value().clone())
            .collect();
        active.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        active
    }

    // ==================== Journal ====================

    /// Every call received so far, in arrival order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.journal.read().await.clone()
    }

    /// Calls of one operation, in arrival order.
    pub async fn calls_of(&self, operation: ApiOperation) -> Vec<RecordedCall> {
        self.journal
            .read()
            .await
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    /// Number of create/update/delete calls on deliverables.
    pub async fn deliverable_write_count(&self) -> usize {
        self.journal
            .read()
            .await
            .iter()
            .filter(|call| call.operation.is_deliverable_write())
            .count()
    }

    pub async fn clear_calls(&self) {
        self.journal.write().await.clear();
    }

    // ==================== Faults ====================

    /// Makes every matching call fail with `error` until [`clear_faults`](Self::clear_faults).
    ///
    /// `target` is the record id, or the title/name for creates; `None` matches all calls.
    pub async fn fail_on(&self, operation: ApiOperation, target: Option<&str>, error: ApiError) {
        self.faults.write().await.push(Fault {
            operation,
            target: target.map(str::to_string),
            error,
        });
    }

    pub async fn clear_faults(&self) {
        self.faults.write().await.clear();
    }

    /// Journals the call and returns the injected failure for it, if any.
    pub(crate) async fn enter(
        &self,
        operation: ApiOperation,
        target: Option<&str>,
    ) -> Result<(), ApiError> {
        let call = RecordedCall::new(operation, target);
        let fault = self
            .faults
            .read()
            .await
            .iter()
            .find(|fault| fault.matches(&call))
            .map(|fault| fault.error.clone());
        self.journal.write().await.push(call);
        match fault {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
