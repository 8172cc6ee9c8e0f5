use std::fmt;

use phasesync_api::ApiError;
use phasesync_core::{CoreError, PhaseType};
use serde::Serialize;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Steps of a single reconciliation call, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStage {
    Validating,
    ResolvingPhase,
    Diffing,
    Deleting,
    Upserting,
    Done,
}

impl ReconcileStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::ResolvingPhase => "resolving_phase",
            Self::Diffing => "diffing",
            Self::Deleting => "deleting",
            Self::Upserting => "upserting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("failed to list phases: {0}")]
    ListPhases(#[source] ApiError),

    #[error("failed to create {phase_type} phase: {source}")]
    CreatePhase {
        phase_type: PhaseType,
        source: ApiError,
    },

    #[error("failed to update phase {phase_id}: {source}")]
    UpdatePhase { phase_id: String, source: ApiError },

    #[error("invalid phase date: {0}")]
    PhaseDate(#[source] CoreError),

    #[error("failed to fetch deliverables of phase {phase_id}: {source}")]
    FetchDeliverables { phase_id: String, source: ApiError },

    #[error("invalid due date for deliverable '{title}': {source}")]
    DeliverableDate { title: String, source: CoreError },

    #[error("failed to delete deliverable {id}: {source}")]
    DeleteDeliverable { id: String, source: ApiError },

    #[error("failed to update deliverable {id}: {source}")]
    UpdateDeliverable { id: String, source: ApiError },

    #[error("failed to create deliverable '{title}': {source}")]
    CreateDeliverable { title: String, source: ApiError },
}

impl ReconcileError {
    /// The step that was running when this error was raised.
    pub fn stage(&self) -> ReconcileStage {
        match self {
            Self::Validation(_) => ReconcileStage::Validating,
            Self::ListPhases(_)
            | Self::CreatePhase { .. }
            | Self::UpdatePhase { .. }
            | Self::PhaseDate(_) => ReconcileStage::ResolvingPhase,
            Self::FetchDeliverables { .. } | Self::DeliverableDate { .. } => {
                ReconcileStage::Diffing
            }
            Self::DeleteDeliverable { .. } => ReconcileStage::Deleting,
            Self::UpdateDeliverable { .. } | Self::CreateDeliverable { .. } => {
                ReconcileStage::Upserting
            }
        }
    }

    /// The remote error behind this failure, if it came from the tracker.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::ListPhases(source)
            | Self::CreatePhase { source, .. }
            | Self::UpdatePhase { source, .. }
            | Self::FetchDeliverables { source, .. }
            | Self::DeleteDeliverable { source, .. }
            | Self::UpdateDeliverable { source, .. }
            | Self::CreateDeliverable { source, .. } => Some(source),
            Self::Validation(_) | Self::PhaseDate(_) | Self::DeliverableDate { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
