//! Bounded status history of a single entity

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::types::StatusType;
use super::value::Timestamped;
use crate::domain::ids::EventTrackingId;
use crate::support::subscription::SubscriptionCounter;
use crate::support::{DomainError, DomainResult, HandlerResult, SubscriptionId};

/// History length used when no explicit size is configured
pub const DEFAULT_MAX_STATUS_SCHEDULE_SIZE: u16 = 15;

/// Change event handed to status change handlers
#[derive(Debug)]
pub struct StatusChange<'a, S> {
    pub timestamp: DateTime<Utc>,
    pub event_tracking_id: &'a EventTrackingId,
    /// The schedule after the change was applied
    pub schedule: &'a StatusSchedule<S>,
    pub new_status: Timestamped<S>,
    /// Previous head, or the unknown sentinel if the history was empty
    pub old_status: Timestamped<S>,
    pub data_source: Option<&'a str>,
}

/// Callback invoked on every effective status change
pub type StatusChangedHandler<S> =
    Arc<dyn for<'a> Fn(&StatusChange<'a, S>) -> HandlerResult<()> + Send + Sync>;

/// Time-ordered, most-recent-first status history with a fixed upper bound.
///
/// Cloning yields a detached copy of the history; handlers are not cloned.
pub struct StatusSchedule<S> {
    entries: VecDeque<Timestamped<S>>,
    max_size: u16,
    handlers: Vec<(SubscriptionId, StatusChangedHandler<S>)>,
    subscriptions: SubscriptionCounter,
}

impl<S: StatusType> StatusSchedule<S> {
    pub fn new(max_size: u16) -> DomainResult<Self> {
        if max_size == 0 {
            return Err(DomainError::invalid_argument(
                "max_size",
                "a status schedule must retain at least one entry",
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(max_size as usize),
            max_size,
            handlers: Vec::new(),
            subscriptions: SubscriptionCounter::default(),
        })
    }

    /// Schedule seeded with an initial status. The seed does not notify.
    pub fn with_initial(max_size: u16, initial: Timestamped<S>) -> DomainResult<Self> {
        let mut schedule = Self::new(max_size)?;
        schedule.entries.push_front(initial);
        Ok(schedule)
    }

    pub fn max_size(&self) -> u16 {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Head of the history or the unknown sentinel
    pub fn current(&self) -> Timestamped<S> {
        self.entries
            .front()
            .cloned()
            .unwrap_or_else(Timestamped::unknown)
    }

    pub fn current_status(&self) -> S {
        self.entries
            .front()
            .map(|entry| entry.value.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the history, most recent first
    pub fn history(&self, max_count: Option<usize>) -> Vec<Timestamped<S>> {
        let take = max_count.unwrap_or(self.entries.len());
        self.entries.iter().take(take).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timestamped<S>> + '_ {
        self.entries.iter()
    }

    /// Record `value` observed at `timestamp`.
    ///
    /// Returns `Ok(true)` when the current status changed. Repeating the
    /// current status is a no-op. A timestamp older than the head is
    /// filed at its ordered position and never changes the current
    /// status. The first failing handler aborts notification and its
    /// error is returned; the history keeps the new entry.
    pub fn insert(
        &mut self,
        value: S,
        timestamp: DateTime<Utc>,
        event_tracking_id: &EventTrackingId,
        data_source: Option<&str>,
    ) -> HandlerResult<bool> {
        let old_status = self.current();

        if old_status.value == value {
            trace!(status = %value, "Status unchanged, insert ignored");
            return Ok(false);
        }

        if let Some(head) = self.entries.front() {
            if timestamp < head.timestamp {
                self.insert_late(Timestamped::new(timestamp, value));
                return Ok(false);
            }
        }

        let new_status = Timestamped::new(timestamp, value);
        self.entries.push_front(new_status.clone());
        self.entries.truncate(self.max_size as usize);

        debug!(
            %event_tracking_id,
            old = %old_status.value,
            new = %new_status.value,
            data_source,
            "Status changed"
        );

        let change = StatusChange {
            timestamp,
            event_tracking_id,
            schedule: &*self,
            new_status,
            old_status,
            data_source,
        };
        for (_, handler) in &self.handlers {
            handler(&change)?;
        }

        Ok(true)
    }

    /// Insert at `Utc::now()` under a fresh event tracking id
    pub fn set_status(&mut self, value: S) -> HandlerResult<bool> {
        self.insert(value, Utc::now(), &EventTrackingId::new(), None)
    }

    fn insert_late(&mut self, entry: Timestamped<S>) {
        let position = self
            .entries
            .iter()
            .position(|existing| existing.timestamp <= entry.timestamp)
            .unwrap_or(self.entries.len());

        // Adjacent entries never repeat a status
        let newer = position.checked_sub(1).and_then(|index| self.entries.get(index));
        let older = self.entries.get(position);
        if [newer, older]
            .into_iter()
            .flatten()
            .any(|neighbour| neighbour.value == entry.value)
        {
            return;
        }

        trace!(status = %entry.value, position, "Late status filed into history");
        self.entries.insert(position, entry);
        self.entries.truncate(self.max_size as usize);
    }

    /// Register a change handler. Handlers run in subscription order.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: for<'a> Fn(&StatusChange<'a, S>) -> HandlerResult<()> + Send + Sync + 'static,
    {
        let id = self.subscriptions.next();
        self.handlers.push((id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() < before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<S: StatusType> Default for StatusSchedule<S> {
    fn default() -> Self {
        Self {
            entries: VecDeque::with_capacity(DEFAULT_MAX_STATUS_SCHEDULE_SIZE as usize),
            max_size: DEFAULT_MAX_STATUS_SCHEDULE_SIZE,
            handlers: Vec::new(),
            subscriptions: SubscriptionCounter::default(),
        }
    }
}

impl<S: Clone> Clone for StatusSchedule<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            max_size: self.max_size,
            handlers: Vec::new(),
            subscriptions: SubscriptionCounter::default(),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for StatusSchedule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSchedule")
            .field("entries", &self.entries)
            .field("max_size", &self.max_size)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
