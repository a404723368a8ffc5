//! Delta between two status snapshots of one operator's entities

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::support::{DomainError, DomainResult};

/// Build a snapshot map from `(id, status)` pairs, rejecting duplicate ids.
pub fn status_snapshot<Id, S, I>(pairs: I) -> DomainResult<BTreeMap<Id, S>>
where
    Id: Ord + fmt::Display,
    I: IntoIterator<Item = (Id, S)>,
{
    let mut snapshot = BTreeMap::new();
    for (id, status) in pairs {
        if snapshot.contains_key(&id) {
            return Err(DomainError::DuplicateId(id.to_string()));
        }
        snapshot.insert(id, status);
    }
    Ok(snapshot)
}

/// Entries that appeared, changed or disappeared between two snapshots.
/// Unchanged entries are not reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDiff<OperatorId, Id: Ord, S> {
    operator_id: OperatorId,
    timestamp: DateTime<Utc>,
    new_statuses: BTreeMap<Id, S>,
    changed_statuses: BTreeMap<Id, S>,
    removed_ids: BTreeSet<Id>,
}

impl<OperatorId, Id, S> StatusDiff<OperatorId, Id, S>
where
    Id: Ord + Clone,
    S: PartialEq + Clone,
{
    pub fn compute(
        operator_id: OperatorId,
        previous: &BTreeMap<Id, S>,
        current: &BTreeMap<Id, S>,
    ) -> Self {
        let mut new_statuses = BTreeMap::new();
        let mut changed_statuses = BTreeMap::new();

        for (id, status) in current {
            match previous.get(id) {
                None => {
                    new_statuses.insert(id.clone(), status.clone());
                }
                Some(old) if old != status => {
                    changed_statuses.insert(id.clone(), status.clone());
                }
                Some(_) => {}
            }
        }

        let removed_ids = previous
            .keys()
            .filter(|id| !current.contains_key(*id))
            .cloned()
            .collect();

        Self {
            operator_id,
            timestamp: Utc::now(),
            new_statuses,
            changed_statuses,
            removed_ids,
        }
    }

    /// Replay the diff onto `snapshot`, turning the previous snapshot
    /// into the current one.
    pub fn apply_to(&self, snapshot: &mut BTreeMap<Id, S>) {
        for (id, status) in self.new_statuses.iter().chain(&self.changed_statuses) {
            snapshot.insert(id.clone(), status.clone());
        }
        for id in &self.removed_ids {
            snapshot.remove(id);
        }
    }
}

impl<OperatorId, Id: Ord, S> StatusDiff<OperatorId, Id, S> {
    pub fn operator_id(&self) -> &OperatorId {
        &self.operator_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn new_statuses(&self) -> &BTreeMap<Id, S> {
        &self.new_statuses
    }

    pub fn changed_statuses(&self) -> &BTreeMap<Id, S> {
        &self.changed_statuses
    }

    pub fn removed_ids(&self) -> &BTreeSet<Id> {
        &self.removed_ids
    }

    pub fn len(&self) -> usize {
        self.new_statuses.len() + self.changed_statuses.len() + self.removed_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<OperatorId: fmt::Display, Id: Ord, S> fmt::Display for StatusDiff<OperatorId, Id, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatusDiff for {}: {} new, {} changed, {} removed",
            self.operator_id,
            self.new_statuses.len(),
            self.changed_statuses.len(),
            self.removed_ids.len()
        )
    }
}
