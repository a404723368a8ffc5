//! Outcome of a mutation on a batch of entities

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use super::entity::EntityResult;
use super::{classify, join_descriptions, Entity, PushDataResultTypes, Verb, Warning};
use crate::domain::ids::EventTrackingId;

#[derive(Debug, Clone)]
pub struct EntitiesResult<E: Entity, V> {
    pub result: PushDataResultTypes,
    pub successful: Vec<EntityResult<E, V>>,
    pub rejected: Vec<EntityResult<E, V>>,
    pub event_tracking_id: EventTrackingId,
    pub auth_id: Option<String>,
    pub description: Option<String>,
    pub warnings: Vec<Warning>,
    pub runtime: Option<Duration>,
}

impl<E: Entity, V: Verb> EntitiesResult<E, V> {
    /// Envelope around per-entity results. The overall result is the
    /// outcome shared by every entity, `Partial` if they differ and
    /// `NoOperation` for an empty batch.
    pub fn from_results<I>(event_tracking_id: EventTrackingId, results: I, runtime: Option<Duration>) -> Self
    where
        I: IntoIterator<Item = EntityResult<E, V>>,
    {
        let results: Vec<_> = results.into_iter().collect();
        let result = classify(results.iter().map(|r| r.result), PushDataResultTypes::Partial)
            .unwrap_or(PushDataResultTypes::NoOperation);
        let (successful, rejected): (Vec<_>, Vec<_>) =
            results.into_iter().partition(|r| r.is_success());

        Self {
            result,
            successful,
            rejected,
            event_tracking_id,
            auth_id: None,
            description: None,
            warnings: Vec::new(),
            runtime,
        }
    }

    fn uniform<I>(
        entities: I,
        event_tracking_id: EventTrackingId,
        per_entity: impl Fn(E, EventTrackingId) -> EntityResult<E, V>,
    ) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        let results: Vec<_> = entities
            .into_iter()
            .map(|entity| per_entity(entity, event_tracking_id.clone()))
            .collect();
        Self::from_results(event_tracking_id, results, None)
    }

    pub fn success<I: IntoIterator<Item = E>>(entities: I, event_tracking_id: EventTrackingId) -> Self {
        Self::uniform(entities, event_tracking_id, EntityResult::success)
    }

    pub fn no_operation<I: IntoIterator<Item = E>>(entities: I, event_tracking_id: EventTrackingId) -> Self {
        Self::uniform(entities, event_tracking_id, EntityResult::no_operation)
    }

    pub fn enqueued<I: IntoIterator<Item = E>>(entities: I, event_tracking_id: EventTrackingId) -> Self {
        Self::uniform(entities, event_tracking_id, EntityResult::enqueued)
    }

    pub fn admin_down<I: IntoIterator<Item = E>>(entities: I, event_tracking_id: EventTrackingId) -> Self {
        Self::uniform(entities, event_tracking_id, EntityResult::admin_down)
    }

    pub fn lock_timeout<I: IntoIterator<Item = E>>(entities: I, event_tracking_id: EventTrackingId) -> Self {
        Self::uniform(entities, event_tracking_id, EntityResult::lock_timeout)
    }

    pub fn argument_error<I: IntoIterator<Item = E>>(
        entities: I,
        event_tracking_id: EventTrackingId,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        let mut result = Self::uniform(entities, event_tracking_id, |entity, etid| {
            EntityResult::argument_error(entity, etid, description.clone())
        });
        result.result = PushDataResultTypes::ArgumentError;
        result.description = Some(description);
        result
    }

    pub fn error<I: IntoIterator<Item = E>>(
        entities: I,
        event_tracking_id: EventTrackingId,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        let mut result = Self::uniform(entities, event_tracking_id, |entity, etid| {
            EntityResult::error(entity, etid, description.clone())
        });
        result.result = PushDataResultTypes::Error;
        result.description = Some(description);
        result
    }

    /// Merge the results of several batch calls into one envelope.
    ///
    /// Entity lists and warnings are concatenated, descriptions joined by
    /// newlines. The overall result is the one shared by all inputs, or
    /// `Partial`. No inputs means nothing was attempted: `NoOperation`.
    /// Tracking and auth ids come from the first input.
    pub fn flatten<I>(results: I, runtime: Option<Duration>) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let results: Vec<Self> = results.into_iter().collect();

        let result = classify(results.iter().map(|r| r.result), PushDataResultTypes::Partial)
            .unwrap_or(PushDataResultTypes::NoOperation);
        let description = join_descriptions(results.iter().map(|r| r.description.as_deref()));
        let event_tracking_id = results
            .first()
            .map(|r| r.event_tracking_id.clone())
            .unwrap_or_default();
        let auth_id = results.first().and_then(|r| r.auth_id.clone());

        debug!(
            %event_tracking_id,
            inputs = results.len(),
            result = %result,
            "Flattened batch results"
        );

        let mut flattened = Self {
            result,
            successful: Vec::new(),
            rejected: Vec::new(),
            event_tracking_id,
            auth_id,
            description,
            warnings: Vec::new(),
            runtime,
        };
        for r in results {
            flattened.successful.extend(r.successful);
            flattened.rejected.extend(r.rejected);
            flattened.warnings.extend(r.warnings);
        }
        flattened
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
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

    pub fn len(&self) -> usize {
        self.successful.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rejected_ids(&self) -> impl Iterator<Item = &E::Id> + '_ {
        self.rejected.iter().filter_map(|r| r.id.as_ref())
    }

    pub fn to_json(&self) -> Value {
        let mut json = json!({
            "verb": V::NAME,
            "result": self.result.as_str(),
            "eventTrackingId": self.event_tracking_id.to_string(),
            "successful": self.successful.iter().map(EntityResult::to_json).collect::<Vec<_>>(),
            "rejected": self.rejected.iter().map(EntityResult::to_json).collect::<Vec<_>>(),
        });
        if let Some(auth_id) = &self.auth_id {
            json["authId"] = Value::String(auth_id.clone());
        }
        if let Some(description) = &self.description {
            json["description"] = Value::String(description.clone());
        }
        if !self.warnings.is_empty() {
            json["warnings"] = json!(self.warnings);
        }
        if let Some(runtime) = self.runtime {
            json["runtime"] = json!(runtime.as_millis() as u64);
        }
        json
    }
}
