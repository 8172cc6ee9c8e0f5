//! Find-or-create of the one phase a reconciliation targets.

use phasesync_api::TrackerApi;
use phasesync_core::{DesiredPhase, NewPhase, PersistedPhase, PhaseChanges, PhaseType, to_server_datetime};
use tracing::{debug, info};

use crate::error::{ReconcileError, Result};

/// The phase a reconciliation writes into.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPhase {
    pub phase: PersistedPhase,
    /// Whether the phase was created by this resolution.
    pub created: bool,
}

impl ResolvedPhase {
    pub fn id(&self) -> &str {
        &self.phase.id
    }
}

/// Builds the name/description/date payload shared by phase create and update.
///
/// Calendar dates become midnight UTC; blank dates are left out.
pub fn phase_changes(desired: &DesiredPhase) -> Result<PhaseChanges> {
    let range = &desired.date_range;
    Ok(PhaseChanges {
        name: desired.title.clone(),
        description: desired.description.clone(),
        start_date: to_server_datetime(range.start.as_deref()).map_err(ReconcileError::PhaseDate)?,
        end_date: to_server_datetime(range.end.as_deref()).map_err(ReconcileError::PhaseDate)?,
    })
}

/// Picks the phase of `phase_type` within `project_scope`.
///
/// Without a scope the first phase of the type wins.
pub fn select_phase<'a>(
    phases: &'a [PersistedPhase],
    phase_type: PhaseType,
    project_scope: Option<&str>,
) -> Option<&'a PersistedPhase> {
    phases
        .iter()
        .find(|phase| phase.phase_type == phase_type && phase.in_scope(project_scope))
}

pub struct PhaseResolver<'a> {
    api: &'a dyn TrackerApi,
    project_scope: Option<&'a str>,
}

impl<'a> PhaseResolver<'a> {
    pub fn new(api: &'a dyn TrackerApi, project_scope: Option<&'a str>) -> Self {
        Self { api, project_scope }
    }

    /// Looks the phase up without writing anything.
    pub async fn find(&self, phase_type: PhaseType) -> Result<Option<PersistedPhase>> {
        let phases = self
            .api
            .list_phases()
            .await
            .map_err(ReconcileError::ListPhases)?;
        debug!(count = phases.len(), "Listed phases");
        Ok(select_phase(&phases, phase_type, self.project_scope).cloned())
    }

    /// Updates the matching phase unconditionally, or creates it.
    pub async fn resolve(
        &self,
        desired: &DesiredPhase,
        phase_type: PhaseType,
    ) -> Result<ResolvedPhase> {
        let changes = phase_changes(desired)?;

        match self.find(phase_type).await? {
            Some(existing) => {
                let phase = self
                    .api
                    .update_phase(&existing.id, &changes)
                    .await
                    .map_err(|source| ReconcileError::UpdatePhase {
                        phase_id: existing.id.clone(),
                        source,
                    })?;
                debug!(phase_id = %phase.id, "Updated existing phase");
                Ok(ResolvedPhase {
                    phase,
                    created: false,
                })
            }
            None => {
                let new_phase = NewPhase {
                    phase_type,
                    project_id: self.project_scope.map(str::to_string),
                    changes,
                };
                let phase = self
                    .api
                    .create_phase(&new_phase)
                    .await
                    .map_err(|source| ReconcileError::CreatePhase { phase_type, source })?;
                info!(phase_id = %phase.id, "Created phase");
                Ok(ResolvedPhase {
                    phase,
                    created: true,
                })
            }
        }
    }
}
