//! Client-declared target state for one phase.
//!
//! These values live for a single reconciliation call and are never stored.

use serde::{Deserialize, Serialize};

use crate::key::{Keyed, ReconciliationKey};

/// Calendar-date range of a phase (`YYYY-MM-DD` or empty).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredPhase {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub deliverables: Vec<DesiredDeliverable>,
}

impl DesiredPhase {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_date_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.date_range = DateRange::new(start, end);
        self
    }

    #[must_use]
    pub fn with_deliverable(mut self, deliverable: DesiredDeliverable) -> Self {
        self.deliverables.push(deliverable);
        self
    }
}

/// A deliverable as the user left it in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredDeliverable {
    /// Server id, when the editor loaded this item from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    /// Set when the user removed the item locally.
    #[serde(default)]
    pub deleted_at: Option<String>,
}

impl DesiredDeliverable {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    #[must_use]
    pub fn removed_at(mut self, deleted_at: impl Into<String>) -> Self {
        self.deleted_at = Some(deleted_at.into());
        self
    }

    /// An empty marker counts as "not removed".
    pub fn is_removed(&self) -> bool {
        self.deleted_at
            .as_deref()
            .is_some_and(|marker| !marker.trim().is_empty())
    }

    /// Server id, ignoring blank values.
    pub fn server_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

impl Keyed for DesiredDeliverable {
    fn reconciliation_key(&self) -> ReconciliationKey {
        ReconciliationKey::new(&self.title, self.due_date.as_deref())
    }
}
