//! Deliverable differ.
//!
//! Compares the desired deliverables of a phase with what the server holds
//! and decides, per record, whether to delete, create, update or leave it.
//! Matching uses the carried server id when it names an existing record and
//! falls back to the reconciliation key otherwise.

use std::collections::{HashMap, HashSet};

use phasesync_core::{
    DeliverableChanges, DesiredDeliverable, Keyed, NewDeliverable, PersistedDeliverable,
    ReconciliationKey, date_only, normalize_title, to_server_date,
};
use serde::Serialize;
use tracing::warn;

use crate::error::{ReconcileError, Result};

/// An existing record and the desired item it should be brought in line with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePair {
    pub existing: PersistedDeliverable,
    pub desired: DesiredDeliverable,
}

/// Remote writes needed to bring a phase's deliverables to the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePlan {
    pub to_delete: Vec<PersistedDeliverable>,
    pub to_create: Vec<DesiredDeliverable>,
    pub to_update: Vec<UpdatePair>,
    /// Active items that matched a record with nothing to change.
    pub unchanged: usize,
}

/// Counts of a [`ReconcilePlan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub deletes: usize,
    pub creates: usize,
    pub updates: usize,
    pub unchanged: usize,
}

impl PlanSummary {
    pub fn writes(&self) -> usize {
        self.deletes + self.creates + self.updates
    }
}

impl ReconcilePlan {
    /// Plan for a phase that does not exist yet: every active item is created.
    pub fn create_all(desired: &[DesiredDeliverable]) -> Self {
        Self {
            to_create: desired.iter().filter(|d| !d.is_removed()).cloned().collect(),
            ..Default::default()
        }
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            deletes: self.to_delete.len(),
            creates: self.to_create.len(),
            updates: self.to_update.len(),
            unchanged: self.unchanged,
        }
    }

    /// True when executing the plan would make no remote call.
    pub fn is_empty(&self) -> bool {
        self.summary().writes() == 0
    }
}

/// Whether the record differs from the desired item in a field we write.
///
/// Titles compare normalized, descriptions treat absent as empty and due
/// dates compare by calendar date only.
pub fn needs_update(existing: &PersistedDeliverable, desired: &DesiredDeliverable) -> bool {
    normalize_title(&existing.title) != normalize_title(&desired.title)
        || existing.description.as_deref().unwrap_or_default()
            != desired.description.as_deref().unwrap_or_default()
        || date_only(existing.due_date.as_deref()) != date_only(desired.due_date.as_deref())
}

/// Builds the write payload for a desired item.
///
/// The due date is sent as midnight UTC of the day the caller wrote, so the
/// stored record keys the same way the desired item does.
pub fn deliverable_changes(desired: &DesiredDeliverable) -> Result<DeliverableChanges> {
    let due_date = to_server_date(desired.due_date.as_deref()).map_err(|source| {
        ReconcileError::DeliverableDate {
            title: desired.title.clone(),
            source,
        }
    })?;
    Ok(DeliverableChanges {
        title: desired.title.trim().to_string(),
        description: desired.description.clone().unwrap_or_default(),
        due_date,
    })
}

pub fn new_deliverable(phase_id: &str, desired: &DesiredDeliverable) -> Result<NewDeliverable> {
    Ok(NewDeliverable {
        phase_id: phase_id.to_string(),
        changes: deliverable_changes(desired)?,
    })
}

/// Computes the plan for one phase.
///
/// Existing records are deleted when explicitly removed (by id, or by key for
/// items without a live id) or when no active item keeps them. Records claimed
/// through a carried id are never matched by key. An active item whose match
/// is being deleted is created afresh.
pub fn plan_deliverables(
    desired: &[DesiredDeliverable],
    existing: &[PersistedDeliverable],
) -> ReconcilePlan {
    let (active, removed): (Vec<&DesiredDeliverable>, Vec<&DesiredDeliverable>) =
        desired.iter().partition(|d| !d.is_removed());

    let by_id: HashMap<&str, &PersistedDeliverable> =
        existing.iter().map(|e| (e.id.as_str(), e)).collect();
    let mut by_key: HashMap<ReconciliationKey, Vec<&PersistedDeliverable>> = HashMap::new();
    for record in existing {
        by_key.entry(record.reconciliation_key()).or_default().push(record);
    }

    // An active item either claims a record through its id, or keeps every
    // record sharing its key.
    let mut claimed_ids: HashSet<&str> = HashSet::new();
    let mut active_keys: HashSet<ReconciliationKey> = HashSet::new();
    for item in &active {
        match item.server_id().filter(|id| by_id.contains_key(id)) {
            Some(id) => {
                claimed_ids.insert(id);
            }
            None => {
                active_keys.insert(item.reconciliation_key());
            }
        }
    }

    let mut removed_ids: HashSet<&str> = HashSet::new();
    let mut removed_keys: HashSet<ReconciliationKey> = HashSet::new();
    for item in &removed {
        match item.server_id().filter(|id| by_id.contains_key(id)) {
            Some(id) => {
                removed_ids.insert(id);
            }
            None => {
                removed_keys.insert(item.reconciliation_key());
            }
        }
    }

    let mut plan = ReconcilePlan::default();
    let mut deleted: HashSet<&str> = HashSet::new();
    for record in existing {
        let key = record.reconciliation_key();
        let explicitly_removed =
            removed_ids.contains(record.id.as_str()) || removed_keys.contains(&key);
        let kept = claimed_ids.contains(record.id.as_str()) || active_keys.contains(&key);
        if (explicitly_removed || !kept) && deleted.insert(record.id.as_str()) {
            plan.to_delete.push(record.clone());
        }
    }

    let mut matched: HashSet<&str> = HashSet::new();
    for item in active {
        let key = item.reconciliation_key();
        let found = match item.server_id().and_then(|id| by_id.get(id)) {
            Some(record) => Some(*record),
            None => by_key.get(&key).and_then(|records| {
                match_by_key(records, &claimed_ids, &deleted, &matched)
            }),
        };

        let Some(record) = found.filter(|r| !deleted.contains(r.id.as_str())) else {
            plan.to_create.push(item.clone());
            continue;
        };
        if !matched.insert(record.id.as_str()) {
            warn!(
                key = %key,
                deliverable_id = %record.id,
                "Skipping desired deliverable that matches an already claimed record"
            );
            continue;
        }
        if needs_update(record, item) {
            plan.to_update.push(UpdatePair {
                existing: record.clone(),
                desired: item.clone(),
            });
        } else {
            plan.unchanged += 1;
        }
    }

    plan
}

/// Picks the record an id-less item keeps among those sharing its key.
///
/// Records claimed by id or being deleted are out. An unmatched record is
/// preferred; when every remaining one is taken, the first is returned so the
/// caller reports the duplicate.
fn match_by_key<'e>(
    records: &[&'e PersistedDeliverable],
    claimed_ids: &HashSet<&str>,
    deleted: &HashSet<&str>,
    matched: &HashSet<&str>,
) -> Option<&'e PersistedDeliverable> {
    let mut open = records
        .iter()
        .copied()
        .filter(|r| !claimed_ids.contains(r.id.as_str()) && !deleted.contains(r.id.as_str()))
        .peekable();
    let first = open.peek().copied();
    open.find(|r| !matched.contains(r.id.as_str())).or(first)
}
