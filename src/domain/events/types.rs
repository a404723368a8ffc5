//! Group events
//!
//! Facts about a charging station group that are broadcast to observers
//! outside the aggregate, e.g. upstream roaming partners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ChargingStationGroupId, ChargingStationId, ChargingStationOperatorId, EventTrackingId};
use crate::domain::status::{
    ChargingStationAdminStatusTypes, ChargingStationGroupAdminStatusTypes, ChargingStationStatusTypes,
    StatusUpdate,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    ChargingStationAdded(ChargingStationAddedEvent),
    ChargingStationRemoved(ChargingStationRemovedEvent),
    ChargingStationStatusChanged(ChargingStationStatusChangedEvent),
    ChargingStationAdminStatusChanged(ChargingStationAdminStatusChangedEvent),
    GroupAdminStatusChanged(GroupAdminStatusChangedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ChargingStationAdded(_) => "charging_station_added",
            Event::ChargingStationRemoved(_) => "charging_station_removed",
            Event::ChargingStationStatusChanged(_) => "charging_station_status_changed",
            Event::ChargingStationAdminStatusChanged(_) => "charging_station_admin_status_changed",
            Event::GroupAdminStatusChanged(_) => "group_admin_status_changed",
        }
    }

    pub fn group_id(&self) -> &ChargingStationGroupId {
        match self {
            Event::ChargingStationAdded(e) => &e.group_id,
            Event::ChargingStationRemoved(e) => &e.group_id,
            Event::ChargingStationStatusChanged(e) => &e.group_id,
            Event::ChargingStationAdminStatusChanged(e) => &e.group_id,
            Event::GroupAdminStatusChanged(e) => &e.group_id,
        }
    }

    pub fn event_tracking_id(&self) -> &EventTrackingId {
        match self {
            Event::ChargingStationAdded(e) => &e.event_tracking_id,
            Event::ChargingStationRemoved(e) => &e.event_tracking_id,
            Event::ChargingStationStatusChanged(e) => &e.event_tracking_id,
            Event::ChargingStationAdminStatusChanged(e) => &e.event_tracking_id,
            Event::GroupAdminStatusChanged(e) => &e.event_tracking_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingStationAddedEvent {
    pub group_id: ChargingStationGroupId,
    pub charging_station_id: ChargingStationId,
    pub operator_id: ChargingStationOperatorId,
    pub event_tracking_id: EventTrackingId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingStationRemovedEvent {
    pub group_id: ChargingStationGroupId,
    pub charging_station_id: ChargingStationId,
    pub event_tracking_id: EventTrackingId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingStationStatusChangedEvent {
    pub group_id: ChargingStationGroupId,
    pub event_tracking_id: EventTrackingId,
    pub update: StatusUpdate<ChargingStationId, ChargingStationStatusTypes>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingStationAdminStatusChangedEvent {
    pub group_id: ChargingStationGroupId,
    pub event_tracking_id: EventTrackingId,
    pub update: StatusUpdate<ChargingStationId, ChargingStationAdminStatusTypes>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAdminStatusChangedEvent {
    pub group_id: ChargingStationGroupId,
    pub event_tracking_id: EventTrackingId,
    pub update: StatusUpdate<ChargingStationGroupId, ChargingStationGroupAdminStatusTypes>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
