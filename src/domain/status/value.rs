//! Timestamped status values

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value observed at a given instant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub timestamp: DateTime<Utc>,
    pub value: T,
}

impl<T> Timestamped<T> {
    pub fn new(timestamp: DateTime<Utc>, value: T) -> Self {
        Self { timestamp, value }
    }

    pub fn now(value: T) -> Self {
        Self::new(Utc::now(), value)
    }
}

impl<T: Default> Timestamped<T> {
    /// Sentinel reported by an empty history
    pub fn unknown() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH, T::default())
    }
}

impl<T: fmt::Display> fmt::Display for Timestamped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} since {}", self.value, self.timestamp.to_rfc3339())
    }
}

/// One observed status of one entity at one instant.
///
/// Field order defines ordering: id, then status, then timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusValue<Id, S> {
    pub id: Id,
    pub status: S,
    pub timestamp: DateTime<Utc>,
}

impl<Id, S> StatusValue<Id, S> {
    pub fn new(id: Id, status: S, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            status,
            timestamp,
        }
    }

    /// Snapshot of an entity's current status
    pub fn snapshot(id: Id, current: Timestamped<S>) -> Self {
        Self::new(id, current.value, current.timestamp)
    }

    pub fn as_timestamped(&self) -> Timestamped<S>
    where
        S: Clone,
    {
        Timestamped::new(self.timestamp, self.status.clone())
    }
}

impl<Id: fmt::Display, S: fmt::Display> fmt::Display for StatusValue<Id, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.id,
            self.status,
            self.timestamp.to_rfc3339()
        )
    }
}
