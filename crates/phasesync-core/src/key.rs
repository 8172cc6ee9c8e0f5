//! Reconciliation keys: the content-derived identity of a deliverable.
//!
//! A key is `normalize(title) + "|" + date_only(due_date)`. Two deliverables
//! with equal keys are treated as the same item; nothing else links a
//! client-side deliverable to its server record unless a server id is carried.

use std::fmt;

use crate::time::date_only;

/// Derived matching key for a deliverable. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconciliationKey(String);

impl ReconciliationKey {
    pub fn new(title: &str, due_date: Option<&str>) -> Self {
        Self(format!("{}|{}", normalize_title(title), date_only(due_date)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReconciliationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed, lower-cased title used both in keys and in title comparison.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Anything that can be matched by reconciliation key.
pub trait Keyed {
    fn reconciliation_key(&self) -> ReconciliationKey;
}
