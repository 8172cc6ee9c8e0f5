use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::deliverable::PersistedDeliverable;
use crate::error::CoreError;

/// Methodology kind of a phase. A project holds at most one phase per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseType {
    Waterfall,
    Scrum,
    Kanban,
    Hybrid,
}

impl PhaseType {
    pub const ALL: [PhaseType; 4] = [
        PhaseType::Waterfall,
        PhaseType::Scrum,
        PhaseType::Kanban,
        PhaseType::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseType::Waterfall => "waterfall",
            PhaseType::Scrum => "scrum",
            PhaseType::Kanban => "kanban",
            PhaseType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waterfall" => Ok(PhaseType::Waterfall),
            "scrum" => Ok(PhaseType::Scrum),
            "kanban" => Ok(PhaseType::Kanban),
            "hybrid" => Ok(PhaseType::Hybrid),
            _ => Err(CoreError::invalid_phase_type(s)),
        }
    }
}

/// A phase as stored on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPhase {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(rename = "type")]
    pub phase_type: PhaseType,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl PersistedPhase {
    /// Whether this phase belongs to `project_id`. `None` accepts any project.
    pub fn in_scope(&self, project_id: Option<&str>) -> bool {
        match project_id {
            Some(wanted) => self.project_id.as_deref() == Some(wanted),
            None => true,
        }
    }
}

/// Phase detail view: the phase plus its non-deleted deliverables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDetail {
    #[serde(flatten)]
    pub phase: PersistedPhase,
    #[serde(default)]
    pub deliverables: Vec<PersistedDeliverable>,
}

/// Core fields written on every phase update.
///
/// Dates are full date-times; absent dates are omitted from the payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChanges {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Payload for creating a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhase {
    #[serde(rename = "type")]
    pub phase_type: PhaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(flatten)]
    pub changes: PhaseChanges,
}
