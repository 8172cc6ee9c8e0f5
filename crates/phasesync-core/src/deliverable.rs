use serde::{Deserialize, Serialize};
use std::fmt;

use crate::key::{Keyed, ReconciliationKey};

/// Workflow status of a deliverable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    #[default]
    Pending,
    InProgress,
    Submitted,
    Approved,
    Rejected,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for DeliverableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliverableStatus::Pending => write!(f, "pending"),
            DeliverableStatus::InProgress => write!(f, "in_progress"),
            DeliverableStatus::Submitted => write!(f, "submitted"),
            DeliverableStatus::Approved => write!(f, "approved"),
            DeliverableStatus::Rejected => write!(f, "rejected"),
            DeliverableStatus::Other(status) => write!(f, "{status}"),
        }
    }
}

/// A deliverable as stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDeliverable {
    pub id: String,
    pub phase_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: DeliverableStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    /// Soft-delete marker. List views never return records with this set.
    #[serde(default)]
    pub deleted_at: Option<String>,
}

impl Keyed for PersistedDeliverable {
    fn reconciliation_key(&self) -> ReconciliationKey {
        ReconciliationKey::new(&self.title, self.due_date.as_deref())
    }
}

/// Fields written when a deliverable is created or updated.
///
/// `description` is always sent so that clearing it reaches the server;
/// a missing due date is sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverableChanges {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Payload for creating a deliverable under a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeliverable {
    pub phase_id: String,
    #[serde(flatten)]
    pub changes: DeliverableChanges,
}
