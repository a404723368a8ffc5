//! Status transitions pushed to upstream systems

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schedule::StatusChange;
use super::value::{StatusValue, Timestamped};

/// "Entity `id` changed from `old_status` to `new_status`", optionally
/// attributed to the data source that reported it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusUpdate<Id, S> {
    pub id: Id,
    pub new_status: Timestamped<S>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_status: Option<Timestamped<S>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl<Id, S> StatusUpdate<Id, S> {
    pub fn new(
        id: Id,
        new_status: Timestamped<S>,
        old_status: Option<Timestamped<S>>,
        data_source: Option<String>,
    ) -> Self {
        Self {
            id,
            new_status,
            old_status,
            data_source,
        }
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = Some(data_source.into());
        self
    }

    /// The new status as a plain status value
    pub fn to_status_value(&self) -> StatusValue<Id, S>
    where
        Id: Clone,
        S: Clone,
    {
        StatusValue::new(
            self.id.clone(),
            self.new_status.value.clone(),
            self.new_status.timestamp,
        )
    }
}

impl<Id, S: Clone + Default + PartialEq> StatusUpdate<Id, S> {
    /// Build an update from a schedule change event. The unknown
    /// sentinel of a previously empty history maps to no old status.
    pub fn from_change(id: Id, change: &StatusChange<'_, S>) -> Self {
        let old_status = if change.old_status == Timestamped::unknown() {
            None
        } else {
            Some(change.old_status.clone())
        };

        Self {
            id,
            new_status: change.new_status.clone(),
            old_status,
            data_source: change.data_source.map(String::from),
        }
    }
}

impl<Id: fmt::Display, S: fmt::Display> fmt::Display for StatusUpdate<Id, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old_status {
            Some(old) => write!(f, "{}: {} -> {}", self.id, old.value, self.new_status.value)?,
            None => write!(f, "{}: {}", self.id, self.new_status.value)?,
        }
        if let Some(source) = &self.data_source {
            write!(f, " [{}]", source)?;
        }
        Ok(())
    }
}
