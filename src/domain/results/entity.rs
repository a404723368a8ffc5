//! Outcome of a mutation on a single entity

use std::marker::PhantomData;
use std::time::Duration;

use serde_json::{json, Value};

use super::{Entity, PushDataResultTypes, Verb, Warning};
use crate::domain::ids::EventTrackingId;

#[derive(Debug, Clone)]
pub struct EntityResult<E: Entity, V> {
    /// Subject of the mutation, absent when only the id is known
    pub entity: Option<E>,
    pub id: Option<E::Id>,
    pub result: PushDataResultTypes,
    pub event_tracking_id: EventTrackingId,
    /// Identity of the party that produced this result
    pub auth_id: Option<String>,
    pub description: Option<String>,
    pub warnings: Vec<Warning>,
    pub runtime: Option<Duration>,
    verb: PhantomData<fn() -> V>,
}

impl<E: Entity, V: Verb> EntityResult<E, V> {
    fn new(
        entity: Option<E>,
        id: Option<E::Id>,
        result: PushDataResultTypes,
        event_tracking_id: EventTrackingId,
        description: Option<String>,
    ) -> Self {
        Self {
            entity,
            id,
            result,
            event_tracking_id,
            auth_id: None,
            description,
            warnings: Vec::new(),
            runtime: None,
            verb: PhantomData,
        }
    }

    fn about(
        entity: E,
        result: PushDataResultTypes,
        event_tracking_id: EventTrackingId,
        description: Option<String>,
    ) -> Self {
        let id = entity.id().clone();
        Self::new(Some(entity), Some(id), result, event_tracking_id, description)
    }

    pub fn success(entity: E, event_tracking_id: EventTrackingId) -> Self {
        Self::about(entity, PushDataResultTypes::Success, event_tracking_id, None)
    }

    pub fn no_operation(entity: E, event_tracking_id: EventTrackingId) -> Self {
        Self::about(entity, PushDataResultTypes::NoOperation, event_tracking_id, None)
    }

    pub fn enqueued(entity: E, event_tracking_id: EventTrackingId) -> Self {
        Self::about(entity, PushDataResultTypes::Enqueued, event_tracking_id, None)
    }

    pub fn argument_error(
        entity: E,
        event_tracking_id: EventTrackingId,
        description: impl Into<String>,
    ) -> Self {
        Self::about(
            entity,
            PushDataResultTypes::ArgumentError,
            event_tracking_id,
            Some(description.into()),
        )
    }

    pub fn error(entity: E, event_tracking_id: EventTrackingId, description: impl Into<String>) -> Self {
        Self::about(
            entity,
            PushDataResultTypes::Error,
            event_tracking_id,
            Some(description.into()),
        )
    }

    pub fn admin_down(entity: E, event_tracking_id: EventTrackingId) -> Self {
        Self::about(entity, PushDataResultTypes::AdminDown, event_tracking_id, None)
    }

    pub fn lock_timeout(entity: E, event_tracking_id: EventTrackingId) -> Self {
        Self::about(entity, PushDataResultTypes::LockTimeout, event_tracking_id, None)
    }

    /// Result about an entity known only by its id, e.g. a removal of
    /// something that is not there.
    pub fn for_id(id: E::Id, result: PushDataResultTypes, event_tracking_id: EventTrackingId) -> Self {
        Self::new(None, Some(id), result, event_tracking_id, None)
    }

    /// Argument error for a request that carried no usable entity
    pub fn missing_entity(event_tracking_id: EventTrackingId, description: impl Into<String>) -> Self {
        Self::new(
            None,
            None,
            PushDataResultTypes::ArgumentError,
            event_tracking_id,
            Some(description.into()),
        )
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

    pub fn verb(&self) -> &'static str {
        V::NAME
    }

    pub fn to_json(&self) -> Value {
        let mut json = json!({
            "verb": V::NAME,
            "result": self.result.as_str(),
            "eventTrackingId": self.event_tracking_id.to_string(),
        });
        if let Some(id) = &self.id {
            json["id"] = Value::String(id.to_string());
        }
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

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::results::{AddEntityResult, DeleteEntityResult};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Meter {
        pub id: String,
    }

    impl Entity for Meter {
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    pub(crate) fn meter(id: &str) -> Meter {
        Meter { id: id.to_string() }
    }

    #[test]
    fn factories_tag_result_type_and_id() {
        let etid = EventTrackingId::new();
        let ok = AddEntityResult::success(meter("M1"), etid.clone());
        assert_eq!(ok.result, PushDataResultTypes::Success);
        assert_eq!(ok.id.as_deref(), Some("M1"));
        assert!(ok.is_success());
        assert_eq!(ok.verb(), "add");

        let down = AddEntityResult::admin_down(meter("M2"), etid.clone());
        assert_eq!(down.result, PushDataResultTypes::AdminDown);
        assert!(!down.is_success());

        let timeout = AddEntityResult::lock_timeout(meter("M3"), etid);
        assert_eq!(timeout.result, PushDataResultTypes::LockTimeout);
    }

    #[test]
    fn error_results_carry_a_description() {
        let etid = EventTrackingId::new();
        let err = AddEntityResult::error(meter("M1"), etid.clone(), "sink rejected the meter");
        assert_eq!(err.description.as_deref(), Some("sink rejected the meter"));

        let arg = AddEntityResult::<Meter>::missing_entity(etid, "no meter given");
        assert_eq!(arg.result, PushDataResultTypes::ArgumentError);
        assert!(arg.entity.is_none());
        assert!(arg.id.is_none());
    }

    #[test]
    fn json_includes_optional_fields_only_when_present() {
        let etid = EventTrackingId::new();
        let result = DeleteEntityResult::<Meter>::for_id(
            "M9".to_string(),
            PushDataResultTypes::NoOperation,
            etid.clone(),
        )
        .with_warning("meter was already gone")
        .with_runtime(Duration::from_millis(12));

        let json = result.to_json();
        assert_eq!(json["verb"], "delete");
        assert_eq!(json["result"], "NoOperation");
        assert_eq!(json["id"], "M9");
        assert_eq!(json["eventTrackingId"], etid.to_string());
        assert_eq!(json["warnings"], json!(["meter was already gone"]));
        assert_eq!(json["runtime"], 12);
        assert!(json.get("description").is_none());
        assert!(json.get("authId").is_none());
    }
}
