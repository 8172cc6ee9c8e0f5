//! End-to-end reconciliation runs against the in-memory tracker.

use std::sync::Arc;

use phasesync_api::{ApiError, DynTrackerApi};
use phasesync_core::{DesiredDeliverable, DesiredPhase, PersistedDeliverable, PhaseType};
use phasesync_engine::{
    ReconcileError, ReconcileOutcome, ReconcileStage, Reconciler, ReconcilerOptions,
};
use phasesync_memory::{ApiOperation, InMemoryTracker};

fn setup(project: Option<&str>) -> (Arc<InMemoryTracker>, Reconciler) {
    let tracker = Arc::new(InMemoryTracker::new());
    let api: DynTrackerApi = tracker.clone();
    let options = match project {
        Some(project) => ReconcilerOptions::default().with_project_scope(project),
        None => ReconcilerOptions::default(),
    };
    (tracker, Reconciler::with_options(api, options))
}

fn development(deliverables: Vec<DesiredDeliverable>) -> DesiredPhase {
    let mut desired = DesiredPhase::new("Development", "Build the product")
        .with_date_range("2025-02-01", "2025-04-01");
    desired.deliverables = deliverables;
    desired
}

async fn operations(tracker: &InMemoryTracker) -> Vec<ApiOperation> {
    tracker.calls().await.into_iter().map(|c| c.operation).collect()
}

#[tokio::test]
async fn development_scrum_scenario() {
    let (tracker, reconciler) = setup(Some("proj-1"));
    let phase = tracker.insert_phase(Some("proj-1"), PhaseType::Scrum, "Development");
    let code = tracker.insert_deliverable(&phase.id, "sprint 1 code", Some("2025-02-15T00:00:00Z"));
    let old = tracker.insert_deliverable(&phase.id, "Old Doc", Some("2025-01-01T00:00:00Z"));

    let desired = development(vec![
        DesiredDeliverable::new("Sprint 1 Code").with_due_date("2025-02-15"),
        DesiredDeliverable::new("API Docs")
            .with_due_date("2025-03-01")
            .removed_at("2025-01-20T10:00:00Z"),
    ]);

    let outcome = reconciler.reconcile(PhaseType::Scrum, &desired).await;
    assert_eq!(outcome.phase_id(), Some(phase.id.as_str()));

    assert_eq!(
        operations(&tracker).await,
        vec![
            ApiOperation::ListPhases,
            ApiOperation::UpdatePhase,
            ApiOperation::GetPhaseDetail,
            ApiOperation::DeleteDeliverable,
        ]
    );
    let deletes = tracker.calls_of(ApiOperation::DeleteDeliverable).await;
    assert_eq!(deletes[0].target.as_deref(), Some(old.id.as_str()));

    assert!(tracker.deliverable(&old.id).unwrap().deleted_at.is_some());
    let kept = tracker.deliverable(&code.id).unwrap();
    assert_eq!(kept.title, "sprint 1 code");
    assert!(kept.deleted_at.is_none());

    let stored = tracker.phase(&phase.id).unwrap();
    assert_eq!(stored.description.as_deref(), Some("Build the product"));
    assert_eq!(stored.start_date.as_deref(), Some("2025-02-01T00:00:00Z"));
    assert_eq!(stored.end_date.as_deref(), Some("2025-04-01T00:00:00Z"));
}

#[tokio::test]
async fn second_run_makes_no_deliverable_writes() {
    let (tracker, reconciler) = setup(None);
    let desired = development(vec![
        DesiredDeliverable::new("Sprint 1 Code").with_due_date("2025-02-15"),
        DesiredDeliverable::new("Release Notes").with_description("Customer facing"),
        DesiredDeliverable::new("Ghost").removed_at("2025-01-20"),
    ]);

    let first = reconciler.reconcile(PhaseType::Scrum, &desired).await;
    assert!(first.is_success());
    assert_eq!(tracker.calls_of(ApiOperation::CreateDeliverable).await.len(), 2);

    tracker.clear_calls().await;
    let second = reconciler.reconcile(PhaseType::Scrum, &desired).await;
    assert_eq!(second.phase_id(), first.phase_id());
    assert_eq!(tracker.deliverable_write_count().await, 0);
    assert_eq!(
        operations(&tracker).await,
        vec![
            ApiOperation::ListPhases,
            ApiOperation::UpdatePhase,
            ApiOperation::GetPhaseDetail,
        ]
    );
}

#[tokio::test]
async fn creates_missing_phase_in_scope() {
    let (tracker, reconciler) = setup(Some("proj-2"));
    let other = tracker.insert_phase(Some("proj-1"), PhaseType::Kanban, "Flow");

    let desired = DesiredPhase::new("Flow", "Continuous delivery")
        .with_deliverable(DesiredDeliverable::new("Board setup"));
    let report = reconciler
        .run(PhaseType::Kanban, &desired)
        .await
        .expect("reconcile");

    assert!(report.phase_created);
    assert_ne!(report.phase_id, other.id);
    let created = tracker.phase(&report.phase_id).unwrap();
    assert_eq!(created.project_id.as_deref(), Some("proj-2"));
    assert_eq!(created.phase_type, PhaseType::Kanban);
    assert_eq!(created.start_date, None);
    assert_eq!(tracker.active_deliverables(&report.phase_id).len(), 1);
    assert!(tracker.active_deliverables(&other.id).is_empty());
}

#[tokio::test]
async fn omitted_deliverables_are_deleted_and_changed_ones_updated() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Waterfall, "Design");
    let spec = tracker.insert_deliverable(&phase.id, "Spec", None);
    let mockups = tracker.insert_deliverable(&phase.id, "Mockups", None);

    let desired = DesiredPhase::new("Design", "Specify everything")
        .with_deliverable(DesiredDeliverable::new("Spec").with_description("Signed off"));
    let report = reconciler
        .run(PhaseType::Waterfall, &desired)
        .await
        .expect("reconcile");

    assert_eq!(report.plan.deletes, 1);
    assert_eq!(report.plan.updates, 1);
    assert_eq!(report.execution.updated, 1);
    assert!(tracker.deliverable(&mockups.id).unwrap().deleted_at.is_some());
    assert_eq!(
        tracker.deliverable(&spec.id).unwrap().description.as_deref(),
        Some("Signed off")
    );
    assert!(tracker.calls_of(ApiOperation::CreateDeliverable).await.is_empty());
}

#[tokio::test]
async fn redated_deliverable_is_replaced() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
    let code = tracker.insert_deliverable(&phase.id, "Code", Some("2025-02-15T00:00:00Z"));

    let desired = development(vec![DesiredDeliverable::new("Code").with_due_date("2025-02-20")]);
    assert!(reconciler.reconcile(PhaseType::Scrum, &desired).await.is_success());

    assert!(tracker.deliverable(&code.id).unwrap().deleted_at.is_some());
    let active = tracker.active_deliverables(&phase.id);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].due_date.as_deref(), Some("2025-02-20T00:00:00Z"));
}

#[tokio::test]
async fn carried_id_keeps_record_across_rename() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
    let code = tracker.insert_deliverable(&phase.id, "Code", Some("2025-02-15T00:00:00Z"));

    let desired = development(vec![
        DesiredDeliverable::new("Backend Code")
            .with_id(code.id.clone())
            .with_due_date("2025-02-20"),
    ]);
    assert!(reconciler.reconcile(PhaseType::Scrum, &desired).await.is_success());

    let stored = tracker.deliverable(&code.id).unwrap();
    assert!(stored.deleted_at.is_none());
    assert_eq!(stored.title, "Backend Code");
    assert_eq!(stored.due_date.as_deref(), Some("2025-02-20T00:00:00Z"));
    assert!(tracker.calls_of(ApiOperation::DeleteDeliverable).await.is_empty());
}

#[tokio::test]
async fn renamed_record_and_new_item_with_its_old_title_settle_in_one_run() {
    for rename_first in [true, false] {
        let (tracker, reconciler) = setup(None);
        let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
        let code = tracker.insert_deliverable(&phase.id, "Code", None);

        let renamed = DesiredDeliverable::new("Backend Code").with_id(code.id.clone());
        let fresh = DesiredDeliverable::new("Code");
        let desired = development(if rename_first {
            vec![renamed, fresh]
        } else {
            vec![fresh, renamed]
        });

        assert!(reconciler.reconcile(PhaseType::Scrum, &desired).await.is_success());
        let titles = |records: Vec<PersistedDeliverable>| {
            records.into_iter().map(|d| d.title).collect::<Vec<_>>()
        };
        assert_eq!(titles(tracker.active_deliverables(&phase.id)), vec!["Backend Code", "Code"]);
        assert_eq!(tracker.deliverable(&code.id).unwrap().title, "Backend Code");

        tracker.clear_calls().await;
        let report = reconciler
            .run(PhaseType::Scrum, &desired)
            .await
            .expect("second run");
        assert_eq!(report.plan.writes(), 0);
        assert_eq!(tracker.deliverable_write_count().await, 0);
        assert_eq!(titles(tracker.active_deliverables(&phase.id)), vec!["Backend Code", "Code"]);
    }
}

#[tokio::test]
async fn offset_due_date_is_stored_on_the_written_day() {
    let (tracker, reconciler) = setup(None);
    let desired = development(vec![
        DesiredDeliverable::new("Report").with_due_date("2025-01-17T01:00:00+02:00"),
    ]);

    let first = reconciler
        .run(PhaseType::Scrum, &desired)
        .await
        .expect("first run");
    let stored = tracker.active_deliverables(&first.phase_id);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].due_date.as_deref(), Some("2025-01-17T00:00:00Z"));

    for _ in 0..2 {
        let again = reconciler
            .run(PhaseType::Scrum, &desired)
            .await
            .expect("repeat run");
        assert_eq!(again.plan.writes(), 0);
        assert_eq!(again.plan.unchanged, 1);
    }
    assert_eq!(tracker.active_deliverables(&first.phase_id)[0].id, stored[0].id);
}

#[tokio::test]
async fn already_deleted_record_is_tolerated() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
    let stale = tracker.insert_deliverable(&phase.id, "Stale", None);
    tracker
        .fail_on(
            ApiOperation::DeleteDeliverable,
            Some(stale.id.as_str()),
            ApiError::not_found("deliverable", stale.id.clone()),
        )
        .await;

    let desired = development(vec![DesiredDeliverable::new("Fresh")]);
    let report = reconciler
        .run(PhaseType::Scrum, &desired)
        .await
        .expect("404 on delete must not fail the run");
    assert_eq!(report.execution.already_deleted, 1);
    assert_eq!(report.execution.created, 1);
}

#[tokio::test]
async fn failed_delete_settles_batch_and_skips_upserts() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
    let locked = tracker.insert_deliverable(&phase.id, "Locked", None);
    let loose = tracker.insert_deliverable(&phase.id, "Loose", None);
    tracker
        .fail_on(
            ApiOperation::DeleteDeliverable,
            Some(locked.id.as_str()),
            ApiError::status(409, "deliverable has evidence"),
        )
        .await;

    let desired = development(vec![DesiredDeliverable::new("Fresh")]);
    let outcome = reconciler.reconcile(PhaseType::Scrum, &desired).await;

    match &outcome {
        ReconcileOutcome::Failed { stage, error } => {
            assert_eq!(*stage, ReconcileStage::Deleting);
            assert!(error.contains("deliverable has evidence"), "{error}");
            assert!(error.contains(&locked.id), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(tracker.deliverable(&loose.id).unwrap().deleted_at.is_some());
    assert!(tracker.deliverable(&locked.id).unwrap().deleted_at.is_none());
    assert!(tracker.calls_of(ApiOperation::CreateDeliverable).await.is_empty());

    // Once the conflict is gone, the same input converges.
    tracker.clear_faults().await;
    assert!(reconciler.reconcile(PhaseType::Scrum, &desired).await.is_success());
    let titles: Vec<String> = tracker
        .active_deliverables(&phase.id)
        .into_iter()
        .map(|d| d.title)
        .collect();
    assert_eq!(titles, vec!["Fresh".to_string()]);
}

#[tokio::test]
async fn deletes_finish_before_any_upsert() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Hybrid, "Mixed");
    tracker.insert_deliverable(&phase.id, "A", None);
    tracker.insert_deliverable(&phase.id, "B", None);
    tracker.insert_deliverable(&phase.id, "Keep", None);

    let desired = DesiredPhase::new("Mixed", "Both worlds").with_deliverable(
        DesiredDeliverable::new("Keep").with_description("changed"),
    )
    .with_deliverable(DesiredDeliverable::new("C"));
    assert!(reconciler.reconcile(PhaseType::Hybrid, &desired).await.is_success());

    let writes: Vec<ApiOperation> = operations(&tracker)
        .await
        .into_iter()
        .filter(ApiOperation::is_deliverable_write)
        .collect();
    assert_eq!(writes.len(), 4);
    let last_delete = writes
        .iter()
        .rposition(|op| *op == ApiOperation::DeleteDeliverable)
        .unwrap();
    let first_upsert = writes
        .iter()
        .position(|op| *op != ApiOperation::DeleteDeliverable)
        .unwrap();
    assert!(last_delete < first_upsert, "{writes:?}");
}

#[tokio::test]
async fn failed_update_does_not_stop_creates() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
    let code = tracker.insert_deliverable(&phase.id, "Code", None);
    tracker
        .fail_on(
            ApiOperation::UpdateDeliverable,
            Some(code.id.as_str()),
            ApiError::transport("connection reset"),
        )
        .await;

    let desired = development(vec![
        DesiredDeliverable::new("Code").with_description("More"),
        DesiredDeliverable::new("Tests"),
    ]);
    let err = reconciler
        .run(PhaseType::Scrum, &desired)
        .await
        .expect_err("update failure must fail the run");

    assert!(matches!(err, ReconcileError::UpdateDeliverable { ref id, .. } if *id == code.id));
    assert_eq!(err.stage(), ReconcileStage::Upserting);
    assert_eq!(tracker.active_deliverables(&phase.id).len(), 2);
}

#[tokio::test]
async fn invalid_input_makes_no_remote_call() {
    let (tracker, reconciler) = setup(None);
    let desired = DesiredPhase::new("", "Build").with_date_range("2025-04-01", "2025-02-01");

    let outcome = reconciler.reconcile(PhaseType::Scrum, &desired).await;
    let errors = outcome.field_errors().expect("field errors");
    assert!(errors.contains("title"));
    assert!(errors.contains("dateRange.end"));
    assert!(errors.contains("deliverables"));
    assert!(tracker.calls().await.is_empty());
}

#[tokio::test]
async fn phase_listing_failure_aborts() {
    let (tracker, reconciler) = setup(None);
    tracker
        .fail_on(ApiOperation::ListPhases, None, ApiError::status(503, "maintenance"))
        .await;

    let desired = development(vec![DesiredDeliverable::new("Code")]);
    let outcome = reconciler.reconcile(PhaseType::Scrum, &desired).await;
    assert_eq!(
        outcome,
        ReconcileOutcome::Failed {
            stage: ReconcileStage::ResolvingPhase,
            error: "failed to list phases: HTTP 503: maintenance".into(),
        }
    );
    assert_eq!(operations(&tracker).await, vec![ApiOperation::ListPhases]);
}

#[tokio::test]
async fn preview_writes_nothing() {
    let (tracker, reconciler) = setup(None);
    let phase = tracker.insert_phase(None, PhaseType::Scrum, "Development");
    tracker.insert_deliverable(&phase.id, "Old Doc", None);

    let desired = development(vec![DesiredDeliverable::new("New Doc")]);
    let preview = reconciler
        .preview(PhaseType::Scrum, &desired)
        .await
        .expect("preview");

    assert_eq!(preview.phase.map(|p| p.id), Some(phase.id.clone()));
    let summary = preview.plan.summary();
    assert_eq!((summary.deletes, summary.creates), (1, 1));
    assert_eq!(
        operations(&tracker).await,
        vec![ApiOperation::ListPhases, ApiOperation::GetPhaseDetail]
    );
}

#[tokio::test]
async fn preview_of_missing_phase_creates_everything() {
    let (tracker, reconciler) = setup(Some("proj-1"));
    let desired = development(vec![
        DesiredDeliverable::new("Code"),
        DesiredDeliverable::new("Gone").removed_at("2025-01-01"),
    ]);
    let preview = reconciler
        .preview(PhaseType::Scrum, &desired)
        .await
        .expect("preview");

    assert!(preview.phase.is_none());
    assert_eq!(preview.plan.to_create.len(), 1);
    assert!(tracker.phases().is_empty());
}

#[tokio::test]
async fn phases_reconcile_concurrently() {
    let (tracker, reconciler) = setup(Some("proj-1"));
    let scrum = development(vec![DesiredDeliverable::new("Code")]);
    let kanban = DesiredPhase::new("Flow", "Support").with_deliverable(DesiredDeliverable::new("Board"));

    let (a, b) = tokio::join!(
        reconciler.reconcile(PhaseType::Scrum, &scrum),
        reconciler.reconcile(PhaseType::Kanban, &kanban),
    );
    assert!(a.is_success() && b.is_success());
    assert_ne!(a.phase_id(), b.phase_id());
    assert_eq!(tracker.phases().len(), 2);
}
