//! Applies a [`ReconcilePlan`] against the tracker.
//!
//! Deletes run first as one concurrent batch, then updates and creates run
//! together as a second batch. A batch always settles completely; the first
//! failure in plan order is reported afterwards. Nothing is rolled back.

use futures_util::future::{join, join_all};
use phasesync_api::TrackerApi;
use phasesync_core::{DeliverableChanges, NewDeliverable};
use serde::Serialize;
use tracing::{debug, warn};

use crate::diff::{ReconcilePlan, deliverable_changes, new_deliverable};
use crate::error::{ReconcileError, Result};

/// What an execution actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub deleted: usize,
    /// Deletes answered with not-found: someone else removed them first.
    pub already_deleted: usize,
    pub updated: usize,
    pub created: usize,
}

pub struct PlanExecutor<'a> {
    api: &'a dyn TrackerApi,
    phase_id: &'a str,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(api: &'a dyn TrackerApi, phase_id: &'a str) -> Self {
        Self { api, phase_id }
    }

    pub async fn execute(&self, plan: &ReconcilePlan) -> Result<ExecutionReport> {
        // Payloads are built up front so a bad date fails before any write.
        let updates = plan
            .to_update
            .iter()
            .map(|pair| {
                deliverable_changes(&pair.desired).map(|changes| (pair.existing.id.as_str(), changes))
            })
            .collect::<Result<Vec<_>>>()?;
        let creates = plan
            .to_create
            .iter()
            .map(|desired| new_deliverable(self.phase_id, desired))
            .collect::<Result<Vec<_>>>()?;

        let mut report = ExecutionReport::default();
        self.delete_batch(plan, &mut report).await?;
        self.upsert_batch(&updates, &creates, &mut report).await?;
        Ok(report)
    }

    async fn delete_batch(&self, plan: &ReconcilePlan, report: &mut ExecutionReport) -> Result<()> {
        if plan.to_delete.is_empty() {
            return Ok(());
        }
        let results = join_all(
            plan.to_delete
                .iter()
                .map(|record| self.api.delete_deliverable(&record.id)),
        )
        .await;

        let mut first_error = None;
        for (record, result) in plan.to_delete.iter().zip(results) {
            match result {
                Ok(()) => {
                    debug!(deliverable_id = %record.id, "Deleted deliverable");
                    report.deleted += 1;
                }
                Err(e) if e.is_not_found() => {
                    debug!(deliverable_id = %record.id, "Deliverable already deleted");
                    report.already_deleted += 1;
                }
                Err(source) => {
                    warn!(deliverable_id = %record.id, category = %source.category(), error = %source, "Delete failed");
                    first_error.get_or_insert(ReconcileError::DeleteDeliverable {
                        id: record.id.clone(),
                        source,
                    });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn upsert_batch(
        &self,
        updates: &[(&str, DeliverableChanges)],
        creates: &[NewDeliverable],
        report: &mut ExecutionReport,
    ) -> Result<()> {
        if updates.is_empty() && creates.is_empty() {
            return Ok(());
        }
        let (update_results, create_results) = join(
            join_all(
                updates
                    .iter()
                    .map(|(id, changes)| self.api.update_deliverable(id, changes)),
            ),
            join_all(creates.iter().map(|new| self.api.create_deliverable(new))),
        )
        .await;

        let mut first_error = None;
        for ((id, _), result) in updates.iter().zip(update_results) {
            match result {
                Ok(updated) => {
                    debug!(deliverable_id = %updated.id, "Updated deliverable");
                    report.updated += 1;
                }
                Err(source) => {
                    warn!(deliverable_id = %id, category = %source.category(), error = %source, "Update failed");
                    first_error.get_or_insert(ReconcileError::UpdateDeliverable {
                        id: id.to_string(),
                        source,
                    });
                }
            }
        }
        for (new, result) in creates.iter().zip(create_results) {
            match result {
                Ok(created) => {
                    debug!(deliverable_id = %created.id, title = %created.title, "Created deliverable");
                    report.created += 1;
                }
                Err(source) => {
                    warn!(title = %new.changes.title, category = %source.category(), error = %source, "Create failed");
                    first_error.get_or_insert(ReconcileError::CreateDeliverable {
                        title: new.changes.title.clone(),
                        source,
                    });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
