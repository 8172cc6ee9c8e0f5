use phasesync_api::DynTrackerApi;
use phasesync_core::{DesiredPhase, PersistedPhase, PhaseType};
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument, warn};

use crate::diff::{PlanSummary, ReconcilePlan, plan_deliverables};
use crate::error::{ReconcileError, ReconcileStage, Result};
use crate::executor::{ExecutionReport, PlanExecutor};
use crate::resolver::PhaseResolver;
use crate::validation::{FieldErrors, validate_desired_phase};

/// Settings fixed for the lifetime of a [`Reconciler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilerOptions {
    /// Project phases are looked up in and created under. `None` accepts any
    /// project when looking up and creates phases without one.
    pub project_scope: Option<String>,
}

impl ReconcilerOptions {
    #[must_use]
    pub fn with_project_scope(mut self, project_id: impl Into<String>) -> Self {
        self.project_scope = Some(project_id.into());
        self
    }
}

/// Result of [`Reconciler::reconcile`] as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied { phase_id: String },
    Invalid { field_errors: FieldErrors },
    Failed { stage: ReconcileStage, error: String },
}

impl ReconcileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn phase_id(&self) -> Option<&str> {
        match self {
            Self::Applied { phase_id } => Some(phase_id),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid { field_errors } => Some(field_errors),
            _ => None,
        }
    }
}

impl From<Result<ReconcileReport>> for ReconcileOutcome {
    fn from(result: Result<ReconcileReport>) -> Self {
        match result {
            Ok(report) => Self::Applied {
                phase_id: report.phase_id,
            },
            Err(ReconcileError::Validation(field_errors)) => Self::Invalid { field_errors },
            Err(e) => Self::Failed {
                stage: e.stage(),
                error: e.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeBody<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<&'a FieldErrors>,
}

// {"success": true, "phaseId": ..} | {"success": false, "error": ..} | {"success": false, "fieldErrors": ..}
impl Serialize for ReconcileOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        OutcomeBody {
            success: self.is_success(),
            phase_id: self.phase_id(),
            error: self.error(),
            field_errors: self.field_errors(),
        }
        .serialize(serializer)
    }
}

/// Details of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub phase_id: String,
    pub phase_created: bool,
    pub plan: PlanSummary,
    pub execution: ExecutionReport,
}

/// What a reconciliation would do, computed without writing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    /// The phase that would be updated; `None` means it would be created.
    pub phase: Option<PersistedPhase>,
    pub plan: ReconcilePlan,
}

/// Brings one phase and its deliverables to a desired state.
///
/// Each call is independent and holds no state between runs. Different
/// phases may be reconciled concurrently through the same instance.
#[derive(Clone)]
pub struct Reconciler {
    api: DynTrackerApi,
    options: ReconcilerOptions,
}

impl Reconciler {
    pub fn new(api: DynTrackerApi) -> Self {
        Self::with_options(api, ReconcilerOptions::default())
    }

    pub fn with_options(api: DynTrackerApi, options: ReconcilerOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    /// Reconciles and folds any failure into the outcome.
    pub async fn reconcile(&self, phase_type: PhaseType, desired: &DesiredPhase) -> ReconcileOutcome {
        let result = self.run(phase_type, desired).await;
        if let Err(e) = &result
            && !e.is_validation()
        {
            warn!(stage = %e.stage(), error = %e, "Reconciliation failed");
        }
        result.into()
    }

    /// Reconciles, returning the typed error on failure.
    ///
    /// Validation happens before any remote call. Writes already made when a
    /// later step fails stay in place; running again converges.
    #[instrument(
        name = "reconcile",
        skip_all,
        fields(phase_type = %phase_type, backend = self.api.backend_name())
    )]
    pub async fn run(&self, phase_type: PhaseType, desired: &DesiredPhase) -> Result<ReconcileReport> {
        validate_desired_phase(desired).map_err(|errors| {
            debug!(problems = errors.len(), "Desired phase rejected");
            ReconcileError::Validation(errors)
        })?;

        let resolved = self.resolver().resolve(desired, phase_type).await?;
        let phase_id = resolved.id().to_string();

        let detail = self
            .api
            .get_phase_detail(&phase_id)
            .await
            .map_err(|source| ReconcileError::FetchDeliverables {
                phase_id: phase_id.clone(),
                source,
            })?;
        let plan = plan_deliverables(&desired.deliverables, &detail.deliverables);
        let summary = plan.summary();
        debug!(
            phase_id = %phase_id,
            existing = detail.deliverables.len(),
            deletes = summary.deletes,
            creates = summary.creates,
            updates = summary.updates,
            "Planned deliverable changes"
        );

        let execution = PlanExecutor::new(self.api.as_ref(), &phase_id)
            .execute(&plan)
            .await?;

        info!(
            phase_id = %phase_id,
            phase_created = resolved.created,
            deletes = summary.deletes,
            creates = summary.creates,
            updates = summary.updates,
            unchanged = summary.unchanged,
            "Reconciled phase"
        );
        Ok(ReconcileReport {
            phase_id,
            phase_created: resolved.created,
            plan: summary,
            execution,
        })
    }

    /// Computes the plan `run` would execute, without writing anything.
    #[instrument(name = "preview", skip_all, fields(phase_type = %phase_type))]
    pub async fn preview(&self, phase_type: PhaseType, desired: &DesiredPhase) -> Result<Preview> {
        validate_desired_phase(desired).map_err(ReconcileError::Validation)?;

        let Some(phase) = self.resolver().find(phase_type).await? else {
            debug!("No matching phase, everything would be created");
            return Ok(Preview {
                phase: None,
                plan: ReconcilePlan::create_all(&desired.deliverables),
            });
        };
        let detail = self
            .api
            .get_phase_detail(&phase.id)
            .await
            .map_err(|source| ReconcileError::FetchDeliverables {
                phase_id: phase.id.clone(),
                source,
            })?;
        Ok(Preview {
            plan: plan_deliverables(&desired.deliverables, &detail.deliverables),
            phase: Some(phase),
        })
    }

    fn resolver(&self) -> PhaseResolver<'_> {
        PhaseResolver::new(self.api.as_ref(), self.options.project_scope.as_deref())
    }
}
