//! Implementation of the TrackerApi trait for InMemoryTracker.

use async_trait::async_trait;
use phasesync_api::{ApiError, ApiResult, TrackerApi};
use phasesync_core::{
    DeliverableChanges, DeliverableStatus, NewDeliverable, NewPhase, PersistedDeliverable,
    PersistedPhase, PhaseChanges, PhaseDetail,
};

use crate::journal::ApiOperation;
use crate::storage::InMemoryTracker;

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[async_trait]
impl TrackerApi for InMemoryTracker {
    async fn list_phases(&self) -> ApiResult<Vec<PersistedPhase>> {
        self.enter(ApiOperation::ListPhases, None).await?;
        Ok(self.phases())
    }

    async fn create_phase(&self, phase: &NewPhase) -> ApiResult<PersistedPhase> {
        self.enter(ApiOperation::CreatePhase, Some(phase.changes.name.as_str()))
            .await?;
        let now = Self::now();
        let created = PersistedPhase {
            id: Self::generate_id(),
            project_id: phase.project_id.clone(),
            phase_type: phase.phase_type,
            name: phase.changes.name.clone(),
            description: non_empty(&phase.changes.description),
            start_date: phase.changes.start_date.clone(),
            end_date: phase.changes.end_date.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.phases.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_phase(&self, id: &str, changes: &PhaseChanges) -> ApiResult<PersistedPhase> {
        self.enter(ApiOperation::UpdatePhase, Some(id)).await?;
        let mut entry = self
            .phases
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found("phase", id))?;
        let phase = entry.value_mut();
        phase.name = changes.name.clone();
        phase.description = non_empty(&changes.description);
        phase.start_date = changes.start_date.clone();
        phase.end_date = changes.end_date.clone();
        phase.updated_at = Some(Self::now());
        Ok(phase.clone())
    }

    async fn get_phase_detail(&self, id: &str) -> ApiResult<PhaseDetail> {
        self.enter(ApiOperation::GetPhaseDetail, Some(id)).await?;
        let phase = self.phase(id).ok_or_else(|| ApiError::not_found("phase", id))?;
        Ok(PhaseDetail {
            deliverables: self.active_deliverables(id),
            phase,
        })
    }

    async fn create_deliverable(
        &self,
        deliverable: &NewDeliverable,
    ) -> ApiResult<PersistedDeliverable> {
        self.enter(
            ApiOperation::CreateDeliverable,
            Some(deliverable.changes.title.as_str()),
        )
        .await?;
        if !self.phases.contains_key(&deliverable.phase_id) {
            return Err(ApiError::not_found("phase", &deliverable.phase_id));
        }
        let created = PersistedDeliverable {
            id: Self::generate_id(),
            phase_id: deliverable.phase_id.clone(),
            title: deliverable.changes.title.clone(),
            description: non_empty(&deliverable.changes.description),
            status: DeliverableStatus::Pending,
            due_date: deliverable.changes.due_date.clone(),
            deleted_at: None,
        };
        self.deliverables
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_deliverable(
        &self,
        id: &str,
        changes: &DeliverableChanges,
    ) -> ApiResult<PersistedDeliverable> {
        self.enter(ApiOperation::UpdateDeliverable, Some(id)).await?;
        let mut entry = self
            .deliverables
            .get_mut(id)
            .filter(|entry| entry.deleted_at.is_none())
            .ok_or_else(|| ApiError::not_found("deliverable", id))?;
        let deliverable = entry.value_mut();
        deliverable.title = changes.title.clone();
        deliverable.description = non_empty(&changes.description);
        deliverable.due_date = changes.due_date.clone();
        Ok(deliverable.clone())
    }

    async fn delete_deliverable(&self, id: &str) -> ApiResult<()> {
        self.enter(ApiOperation::DeleteDeliverable, Some(id)).await?;
        let mut entry = self
            .deliverables
            .get_mut(id)
            .filter(|entry| entry.deleted_at.is_none())
            .ok_or_else(|| ApiError::not_found("deliverable", id))?;
        entry.value_mut().deleted_at = Some(Self::now_rfc3339());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasesync_core::PhaseType;

    #[tokio::test]
    async fn test_delete_is_soft_and_second_delete_is_not_found() {
        let tracker = InMemoryTracker::new();
        let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
        let deliverable = tracker.insert_deliverable(&phase.id, "Code", Some("2025-02-15"));

        tracker.delete_deliverable(&deliverable.id).await.unwrap();
        let stored = tracker.deliverable(&deliverable.id).expect("still stored");
        assert!(stored.deleted_at.is_some());

        let err = tracker.delete_deliverable(&deliverable.id).await.unwrap_err();
        assert!(err.is_not_found());
        let err = tracker.delete_deliverable("never-existed").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_detail_hides_soft_deleted() {
        let tracker = InMemoryTracker::new();
        let phase = tracker.insert_phase(None, PhaseType::Kanban, "Flow");
        let a = tracker.insert_deliverable(&phase.id, "A", None);
        tracker.insert_deliverable(&phase.id, "B", None);
        tracker.delete_deliverable(&a.id).await.unwrap();

        let detail = tracker.get_phase_detail(&phase.id).await.unwrap();
        assert_eq!(detail.deliverables.len(), 1);
        assert_eq!(detail.deliverables[0].title, "B");
    }

    #[tokio::test]
    async fn test_update_of_deleted_deliverable_is_not_found() {
        let tracker = InMemoryTracker::new();
        let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
        let d = tracker.insert_deliverable(&phase.id, "Code", None);
        tracker.delete_deliverable(&d.id).await.unwrap();

        let err = tracker
            .update_deliverable(&d.id, &DeliverableChanges::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_deliverable_requires_phase() {
        let tracker = InMemoryTracker::new();
        let err = tracker
            .create_deliverable(&NewDeliverable {
                phase_id: "missing".into(),
                changes: DeliverableChanges {
                    title: "Orphan".into(),
                    ..Default::default()
                },
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_fault_leaves_data_untouched() {
        let tracker = InMemoryTracker::new();
        let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
        let d = tracker.insert_deliverable(&phase.id, "Code", None);
        tracker
            .fail_on(
                ApiOperation::DeleteDeliverable,
                Some(d.id.as_str()),
                ApiError::status(503, "maintenance"),
            )
            .await;

        let err = tracker.delete_deliverable(&d.id).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
        assert!(tracker.deliverable(&d.id).unwrap().deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_update_phase_replaces_core_fields() {
        let tracker = InMemoryTracker::new();
        let phase = tracker.insert_phase(Some("p"), PhaseType::Waterfall, "Design");
        let updated = tracker
            .update_phase(
                &phase.id,
                &PhaseChanges {
                    name: "Detailed Design".into(),
                    description: "All the specs".into(),
                    start_date: Some("2025-01-01T00:00:00Z".into()),
                    end_date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Detailed Design");
        assert_eq!(updated.description.as_deref(), Some("All the specs"));
        assert_eq!(updated.project_id.as_deref(), Some("p"));
        assert_eq!(tracker.phase(&phase.id).unwrap(), updated);
    }
}
