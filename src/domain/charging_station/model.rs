//! Charging station entity

use chrono::{DateTime, Utc};

use crate::config::StatusConfig;
use crate::domain::ids::{ChargingStationId, ChargingStationOperatorId, EventTrackingId};
use crate::domain::results::Entity;
use crate::domain::status::{
    ChargingStationAdminStatusTypes, ChargingStationStatusTypes, StatusSchedule, StatusType,
    StatusUpdate, Timestamped,
};
use crate::support::{DomainResult, HandlerResult};

/// Charging station with its status and admin status history
#[derive(Debug, Clone)]
pub struct ChargingStation {
    pub id: ChargingStationId,
    pub operator_id: ChargingStationOperatorId,
    pub name: Option<String>,
    /// When the station was created
    pub registered_at: DateTime<Utc>,
    status: StatusSchedule<ChargingStationStatusTypes>,
    admin_status: StatusSchedule<ChargingStationAdminStatusTypes>,
}

impl ChargingStation {
    /// Station with default history sizes
    pub fn new(id: ChargingStationId, operator_id: ChargingStationOperatorId) -> Self {
        Self {
            id,
            operator_id,
            name: None,
            registered_at: Utc::now(),
            status: StatusSchedule::default(),
            admin_status: StatusSchedule::default(),
        }
    }

    pub fn with_config(
        id: ChargingStationId,
        operator_id: ChargingStationOperatorId,
        config: &StatusConfig,
    ) -> DomainResult<Self> {
        Ok(Self {
            status: StatusSchedule::new(config.max_status_schedule_size)?,
            admin_status: StatusSchedule::new(config.max_admin_status_schedule_size)?,
            ..Self::new(id, operator_id)
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn status(&self) -> Timestamped<ChargingStationStatusTypes> {
        self.status.current()
    }

    pub fn admin_status(&self) -> Timestamped<ChargingStationAdminStatusTypes> {
        self.admin_status.current()
    }

    pub fn status_schedule(&self) -> &StatusSchedule<ChargingStationStatusTypes> {
        &self.status
    }

    pub fn admin_status_schedule(&self) -> &StatusSchedule<ChargingStationAdminStatusTypes> {
        &self.admin_status
    }

    /// Record a new operational status. Returns the transition, or `None`
    /// if the status did not change.
    pub fn set_status(
        &mut self,
        status: ChargingStationStatusTypes,
        timestamp: DateTime<Utc>,
        event_tracking_id: &EventTrackingId,
        data_source: Option<&str>,
    ) -> HandlerResult<Option<StatusUpdate<ChargingStationId, ChargingStationStatusTypes>>> {
        record(&self.id, &mut self.status, status, timestamp, event_tracking_id, data_source)
    }

    pub fn set_admin_status(
        &mut self,
        status: ChargingStationAdminStatusTypes,
        timestamp: DateTime<Utc>,
        event_tracking_id: &EventTrackingId,
        data_source: Option<&str>,
    ) -> HandlerResult<Option<StatusUpdate<ChargingStationId, ChargingStationAdminStatusTypes>>> {
        record(&self.id, &mut self.admin_status, status, timestamp, event_tracking_id, data_source)
    }
}

impl Entity for ChargingStation {
    type Id = ChargingStationId;

    fn id(&self) -> &ChargingStationId {
        &self.id
    }
}

pub(crate) fn record<Id: Clone, S: StatusType>(
    id: &Id,
    schedule: &mut StatusSchedule<S>,
    status: S,
    timestamp: DateTime<Utc>,
    event_tracking_id: &EventTrackingId,
    data_source: Option<&str>,
) -> HandlerResult<Option<StatusUpdate<Id, S>>> {
    let was_empty = schedule.is_empty();
    let old_status = schedule.current();

    if !schedule.insert(status, timestamp, event_tracking_id, data_source)? {
        return Ok(None);
    }

    Ok(Some(StatusUpdate::new(
        id.clone(),
        schedule.current(),
        (!was_empty).then_some(old_status),
        data_source.map(String::from),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn station() -> ChargingStation {
        ChargingStation::new("DE*GEF*S1".parse().unwrap(), "DE*GEF".parse().unwrap())
    }

    #[test]
    fn new_station_is_unknown() {
        let s = station().with_name("Depot north");
        assert_eq!(s.status().value, ChargingStationStatusTypes::Unknown);
        assert_eq!(s.admin_status().value, ChargingStationAdminStatusTypes::Unknown);
        assert_eq!(s.name.as_deref(), Some("Depot north"));
        assert_eq!(s.id().as_str(), "DE*GEF*S1");
    }

    #[test]
    fn set_status_reports_transitions() {
        let mut s = station();
        let etid = EventTrackingId::new();
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let t1 = Utc.timestamp_opt(1_700_000_100, 0).unwrap();

        let first = s
            .set_status(ChargingStationStatusTypes::Available, t0, &etid, Some("ocpp"))
            .unwrap()
            .unwrap();
        assert_eq!(first.old_status, None);
        assert_eq!(first.data_source.as_deref(), Some("ocpp"));

        assert!(s
            .set_status(ChargingStationStatusTypes::Available, t1, &etid, None)
            .unwrap()
            .is_none());

        let second = s
            .set_status(ChargingStationStatusTypes::Charging, t1, &etid, None)
            .unwrap()
            .unwrap();
        assert_eq!(
            second.old_status,
            Some(Timestamped::new(t0, ChargingStationStatusTypes::Available))
        );
        assert_eq!(second.new_status, Timestamped::new(t1, ChargingStationStatusTypes::Charging));
    }

    #[test]
    fn config_sizes_bound_histories() {
        let config = StatusConfig {
            max_status_schedule_size: 2,
            max_admin_status_schedule_size: 1,
        };
        let s = ChargingStation::with_config("S1".parse().unwrap(), "OP".parse().unwrap(), &config).unwrap();
        assert_eq!(s.status_schedule().max_size(), 2);
        assert_eq!(s.admin_status_schedule().max_size(), 1);

        let broken = StatusConfig {
            max_status_schedule_size: 0,
            max_admin_status_schedule_size: 1,
        };
        assert!(ChargingStation::with_config("S1".parse().unwrap(), "OP".parse().unwrap(), &broken).is_err());
    }
}
