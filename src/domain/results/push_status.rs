//! Outcome of pushing a batch of status updates upstream

use std::time::Duration;

use super::{classify, join_descriptions, PushStatusResultTypes, Warning};
use crate::domain::ids::EventTrackingId;
use crate::domain::status::StatusUpdate;

#[derive(Debug, Clone)]
pub struct PushStatusResult<Id, S> {
    pub result: PushStatusResultTypes,
    /// Updates the receiver did not accept
    pub rejected_updates: Vec<StatusUpdate<Id, S>>,
    pub event_tracking_id: EventTrackingId,
    pub auth_id: Option<String>,
    pub description: Option<String>,
    pub warnings: Vec<Warning>,
    pub runtime: Option<Duration>,
}

impl<Id, S> PushStatusResult<Id, S> {
    fn new(
        result: PushStatusResultTypes,
        event_tracking_id: EventTrackingId,
        description: Option<String>,
        rejected_updates: Vec<StatusUpdate<Id, S>>,
    ) -> Self {
        Self {
            result,
            rejected_updates,
            event_tracking_id,
            auth_id: None,
            description,
            warnings: Vec::new(),
            runtime: None,
        }
    }

    pub fn success(event_tracking_id: EventTrackingId) -> Self {
        Self::new(PushStatusResultTypes::Success, event_tracking_id, None, Vec::new())
    }

    pub fn no_operation(event_tracking_id: EventTrackingId) -> Self {
        Self::new(PushStatusResultTypes::NoOperation, event_tracking_id, None, Vec::new())
    }

    pub fn enqueued(event_tracking_id: EventTrackingId) -> Self {
        Self::new(PushStatusResultTypes::Enqueued, event_tracking_id, None, Vec::new())
    }

    pub fn admin_down(event_tracking_id: EventTrackingId, rejected: Vec<StatusUpdate<Id, S>>) -> Self {
        Self::new(PushStatusResultTypes::AdminDown, event_tracking_id, None, rejected)
    }

    pub fn lock_timeout(event_tracking_id: EventTrackingId, rejected: Vec<StatusUpdate<Id, S>>) -> Self {
        Self::new(PushStatusResultTypes::LockTimeout, event_tracking_id, None, rejected)
    }

    pub fn error(
        event_tracking_id: EventTrackingId,
        rejected: Vec<StatusUpdate<Id, S>>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            PushStatusResultTypes::Error,
            event_tracking_id,
            Some(description.into()),
            rejected,
        )
    }

    pub fn with_warning(mut self, warning: impl Into<Warning>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_auth_id(mut self, auth_id: impl Into<String>) -> Self {
        self.auth_id = Some(auth_id.into());
        self
    }

    pub fn with_runtime(mut self, runtime: Duration) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Merge the results of several pushes, with the same classification
    /// as [`EntitiesResult::flatten`](super::EntitiesResult::flatten).
    pub fn flatten<I>(results: I, runtime: Option<Duration>) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let results: Vec<Self> = results.into_iter().collect();

        let result = classify(results.iter().map(|r| r.result), PushStatusResultTypes::Partial)
            .unwrap_or(PushStatusResultTypes::NoOperation);
        let description = join_descriptions(results.iter().map(|r| r.description.as_deref()));
        let event_tracking_id = results
            .first()
            .map(|r| r.event_tracking_id.clone())
            .unwrap_or_default();
        let auth_id = results.first().and_then(|r| r.auth_id.clone());

        let mut flattened = Self {
            result,
            rejected_updates: Vec::new(),
            event_tracking_id,
            auth_id,
            description,
            warnings: Vec::new(),
            runtime,
        };
        for r in results {
            flattened.rejected_updates.extend(r.rejected_updates);
            flattened.warnings.extend(r.warnings);
        }
        flattened
    }
}
