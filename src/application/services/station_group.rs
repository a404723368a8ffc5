//! Charging station group
//!
//! Owns a set of charging stations and lets observers veto or react to
//! membership changes. Membership lives in a `DashMap`, so concurrent
//! adds and removes of different stations need no outside locking; two
//! concurrent operations on the same station id are not ordered.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::events::{
    ChargingStationAddedEvent, ChargingStationAdminStatusChangedEvent, ChargingStationRemovedEvent,
    ChargingStationStatusChangedEvent, Event, GroupAdminStatusChangedEvent, SharedEventBus,
    VotingNotificator,
};
use crate::config::StatusConfig;
use crate::domain::charging_station::model::record;
use crate::domain::charging_station::ChargingStation;
use crate::domain::ids::{ChargingStationGroupId, ChargingStationId, ChargingStationOperatorId, EventTrackingId};
use crate::domain::results::{
    AddEntitiesResult, AddEntityResult, DeleteEntityResult, PushDataResultTypes,
};
use crate::domain::status::{
    status_history_json, ChargingStationAdminStatusTypes, ChargingStationGroupAdminStatusTypes,
    ChargingStationGroupStatusTypes, ChargingStationStatusTypes, HistoryWindow, StatusDiff,
    StatusReport, StatusSchedule, StatusUpdate, Timestamped,
};
use crate::support::{DomainError, DomainResult};

pub const STATUS_REPORT_CONTEXT: &str =
    "https://open.charging.cloud/contexts/wwcp+json/chargingStationStatusReport";
pub const ADMIN_STATUS_REPORT_CONTEXT: &str =
    "https://open.charging.cloud/contexts/wwcp+json/chargingStationAdminStatusReport";

/// Data source recorded on statuses the group computes or cascades itself
const GROUP_DATA_SOURCE: &str = "charging_station_group";

pub type StationVotingNotificator = VotingNotificator<ChargingStationGroup, ChargingStation>;

pub struct ChargingStationGroup {
    id: ChargingStationGroupId,
    name: Option<String>,
    config: StatusConfig,
    stations: DashMap<ChargingStationId, ChargingStation>,
    status: RwLock<StatusSchedule<ChargingStationGroupStatusTypes>>,
    admin_status: RwLock<StatusSchedule<ChargingStationGroupAdminStatusTypes>>,
    on_station_addition: StationVotingNotificator,
    on_station_removal: StationVotingNotificator,
    event_bus: Option<SharedEventBus>,
}

impl ChargingStationGroup {
    pub fn new(id: ChargingStationGroupId, config: &StatusConfig) -> DomainResult<Self> {
        Ok(Self {
            status: RwLock::new(StatusSchedule::new(config.max_status_schedule_size)?),
            admin_status: RwLock::new(StatusSchedule::new(config.max_admin_status_schedule_size)?),
            on_station_addition: VotingNotificator::new(format!("{}/station_addition", id)),
            on_station_removal: VotingNotificator::new(format!("{}/station_removal", id)),
            id,
            name: None,
            config: config.clone(),
            stations: DashMap::new(),
            event_bus: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Publish membership and status facts to `event_bus`
    pub fn with_event_bus(mut self, event_bus: SharedEventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn id(&self) -> &ChargingStationGroupId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Voters may veto, subscribers observe, every station addition
    pub fn on_station_addition(&self) -> &StationVotingNotificator {
        &self.on_station_addition
    }

    pub fn on_station_removal(&self) -> &StationVotingNotificator {
        &self.on_station_removal
    }

    /// A new station sized after this group's configuration
    pub fn create_station(
        &self,
        id: ChargingStationId,
        operator_id: ChargingStationOperatorId,
    ) -> DomainResult<ChargingStation> {
        ChargingStation::with_config(id, operator_id, &self.config)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn contains_station(&self, id: &ChargingStationId) -> bool {
        self.stations.contains_key(id)
    }

    pub fn station(&self, id: &ChargingStationId) -> Option<ChargingStation> {
        self.stations.get(id).map(|station| station.clone())
    }

    pub fn station_ids(&self) -> Vec<ChargingStationId> {
        let mut ids: Vec<_> = self.stations.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Copies of all member stations, ordered by id
    pub fn stations(&self) -> Vec<ChargingStation> {
        let mut stations: Vec<_> = self.stations.iter().map(|entry| entry.value().clone()).collect();
        stations.sort_by(|a, b| a.id.cmp(&b.id));
        stations
    }

    pub fn status(&self) -> Timestamped<ChargingStationGroupStatusTypes> {
        self.status.read().unwrap_or_else(PoisonError::into_inner).current()
    }

    pub fn admin_status(&self) -> Timestamped<ChargingStationGroupAdminStatusTypes> {
        self.admin_status.read().unwrap_or_else(PoisonError::into_inner).current()
    }

    pub fn status_history(&self, max_count: Option<usize>) -> Vec<Timestamped<ChargingStationGroupStatusTypes>> {
        self.status.read().unwrap_or_else(PoisonError::into_inner).history(max_count)
    }

    pub fn admin_status_history(
        &self,
        max_count: Option<usize>,
    ) -> Vec<Timestamped<ChargingStationGroupAdminStatusTypes>> {
        self.admin_status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .history(max_count)
    }

    /// Add a station after its addition was approved by every voter.
    ///
    /// Expected refusals (admin down, duplicate id, veto) are results. A
    /// failing notification subscriber undoes the addition and is
    /// returned as `Err`.
    pub fn add_station(
        &self,
        station: ChargingStation,
        event_tracking_id: &EventTrackingId,
    ) -> DomainResult<AddEntityResult<ChargingStation>> {
        let started = Instant::now();
        let etid = event_tracking_id.clone();

        if !self.admin_status().value.accepts_changes() {
            warn!(group_id = %self.id, charging_station_id = %station.id, "Group is admin down, station not added");
            return Ok(AddEntityResult::admin_down(station, etid).with_runtime(started.elapsed()));
        }

        if self.stations.contains_key(&station.id) {
            let description = format!("Charging station {} is already a member of {}", station.id, self.id);
            return Ok(AddEntityResult::argument_error(station, etid, description).with_runtime(started.elapsed()));
        }

        if !self.on_station_addition.send_voting(event_tracking_id, self, &station)? {
            info!(group_id = %self.id, charging_station_id = %station.id, "Station addition vetoed");
            let description = format!("Addition of charging station {} was vetoed", station.id);
            return Ok(AddEntityResult::error(station, etid, description).with_runtime(started.elapsed()));
        }

        match self.stations.entry(station.id.clone()) {
            Entry::Occupied(_) => {
                let description = format!("Charging station {} is already a member of {}", station.id, self.id);
                return Ok(AddEntityResult::argument_error(station, etid, description).with_runtime(started.elapsed()));
            }
            Entry::Vacant(slot) => {
                slot.insert(station.clone());
            }
        }

        if let Err(e) = self
            .on_station_addition
            .send_notification(event_tracking_id, self, &station)
        {
            self.stations.remove(&station.id);
            warn!(group_id = %self.id, charging_station_id = %station.id, error = %e, "Station addition rolled back");
            return Err(e.into());
        }

        self.publish(Event::ChargingStationAdded(ChargingStationAddedEvent {
            group_id: self.id.clone(),
            charging_station_id: station.id.clone(),
            operator_id: station.operator_id.clone(),
            event_tracking_id: etid.clone(),
            timestamp: Utc::now(),
        }));
        info!(group_id = %self.id, charging_station_id = %station.id, "Charging station added");

        self.refresh_status(event_tracking_id)?;
        Ok(AddEntityResult::success(station, etid).with_runtime(started.elapsed()))
    }

    /// Add several stations; one result per station, classified together.
    /// A failing subscriber rejects only the station it failed on.
    pub fn add_stations<I>(
        &self,
        stations: I,
        event_tracking_id: &EventTrackingId,
    ) -> DomainResult<AddEntitiesResult<ChargingStation>>
    where
        I: IntoIterator<Item = ChargingStation>,
    {
        let started = Instant::now();
        let mut results = Vec::new();
        for station in stations {
            let candidate = station.clone();
            match self.add_station(station, event_tracking_id) {
                Ok(result) => results.push(result),
                // Rolled back by add_station; the rest of the batch still runs
                Err(DomainError::Subscriber(e)) => {
                    results.push(AddEntityResult::error(candidate, event_tracking_id.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        let result = AddEntitiesResult::from_results(event_tracking_id.clone(), results, Some(started.elapsed()));
        debug!(
            group_id = %self.id,
            successful = result.successful.len(),
            rejected = result.rejected.len(),
            result = %result.result,
            "Batch addition finished"
        );
        Ok(result)
    }

    /// Remove a station after its removal was approved by every voter.
    /// Removing a non-member is a `NoOperation`.
    pub fn remove_station(
        &self,
        id: &ChargingStationId,
        event_tracking_id: &EventTrackingId,
    ) -> DomainResult<DeleteEntityResult<ChargingStation>> {
        let started = Instant::now();
        let etid = event_tracking_id.clone();

        let Some(station) = self.station(id) else {
            return Ok(
                DeleteEntityResult::for_id(id.clone(), PushDataResultTypes::NoOperation, etid)
                    .with_description(format!("Charging station {} is not a member of {}", id, self.id))
                    .with_runtime(started.elapsed()),
            );
        };

        if !self.admin_status().value.accepts_changes() {
            return Ok(DeleteEntityResult::admin_down(station, etid).with_runtime(started.elapsed()));
        }

        if !self.on_station_removal.send_voting(event_tracking_id, self, &station)? {
            info!(group_id = %self.id, charging_station_id = %id, "Station removal vetoed");
            let description = format!("Removal of charging station {} was vetoed", id);
            return Ok(DeleteEntityResult::error(station, etid, description).with_runtime(started.elapsed()));
        }

        let Some((_, removed)) = self.stations.remove(id) else {
            return Ok(
                DeleteEntityResult::for_id(id.clone(), PushDataResultTypes::NoOperation, etid)
                    .with_runtime(started.elapsed()),
            );
        };

        if let Err(e) = self
            .on_station_removal
            .send_notification(event_tracking_id, self, &removed)
        {
            self.stations.entry(id.clone()).or_insert(removed);
            warn!(group_id = %self.id, charging_station_id = %id, error = %e, "Station removal rolled back");
            return Err(e.into());
        }

        self.publish(Event::ChargingStationRemoved(ChargingStationRemovedEvent {
            group_id: self.id.clone(),
            charging_station_id: id.clone(),
            event_tracking_id: etid.clone(),
            timestamp: Utc::now(),
        }));
        info!(group_id = %self.id, charging_station_id = %id, "Charging station removed");

        self.refresh_status(event_tracking_id)?;
        Ok(DeleteEntityResult::success(removed, etid).with_runtime(started.elapsed()))
    }

    pub fn set_station_status(
        &self,
        id: &ChargingStationId,
        status: ChargingStationStatusTypes,
        timestamp: DateTime<Utc>,
        event_tracking_id: &EventTrackingId,
        data_source: Option<&str>,
    ) -> DomainResult<Option<StatusUpdate<ChargingStationId, ChargingStationStatusTypes>>> {
        let update = {
            let mut station = self.stations.get_mut(id).ok_or_else(|| not_found(id))?;
            station.set_status(status, timestamp, event_tracking_id, data_source)?
        };

        if let Some(update) = &update {
            self.publish(Event::ChargingStationStatusChanged(ChargingStationStatusChangedEvent {
                group_id: self.id.clone(),
                event_tracking_id: event_tracking_id.clone(),
                update: update.clone(),
            }));
            self.refresh_status(event_tracking_id)?;
        }
        Ok(update)
    }

    pub fn set_station_admin_status(
        &self,
        id: &ChargingStationId,
        status: ChargingStationAdminStatusTypes,
        timestamp: DateTime<Utc>,
        event_tracking_id: &EventTrackingId,
        data_source: Option<&str>,
    ) -> DomainResult<Option<StatusUpdate<ChargingStationId, ChargingStationAdminStatusTypes>>> {
        let update = {
            let mut station = self.stations.get_mut(id).ok_or_else(|| not_found(id))?;
            station.set_admin_status(status, timestamp, event_tracking_id, data_source)?
        };

        if let Some(update) = &update {
            self.publish_admin_update(event_tracking_id, update.clone());
        }
        Ok(update)
    }

    /// Change the group's admin status and cascade it to every member.
    pub fn set_admin_status(
        &self,
        status: ChargingStationGroupAdminStatusTypes,
        timestamp: DateTime<Utc>,
        event_tracking_id: &EventTrackingId,
    ) -> DomainResult<Option<StatusUpdate<ChargingStationGroupId, ChargingStationGroupAdminStatusTypes>>> {
        let update = {
            let mut schedule = self.admin_status.write().unwrap_or_else(PoisonError::into_inner);
            record(&self.id, &mut *schedule, status, timestamp, event_tracking_id, None)?
        };
        let Some(update) = update else {
            return Ok(None);
        };
        info!(group_id = %self.id, %status, "Group admin status changed");

        let cascaded = ChargingStationAdminStatusTypes::from(status);
        let mut station_updates = Vec::new();
        for mut station in self.stations.iter_mut() {
            if let Some(station_update) =
                station.set_admin_status(cascaded, timestamp, event_tracking_id, Some(GROUP_DATA_SOURCE))?
            {
                station_updates.push(station_update);
            }
        }
        debug!(group_id = %self.id, stations = station_updates.len(), "Admin status cascaded");
        for station_update in station_updates {
            self.publish_admin_update(event_tracking_id, station_update);
        }

        self.publish(Event::GroupAdminStatusChanged(GroupAdminStatusChangedEvent {
            group_id: self.id.clone(),
            event_tracking_id: event_tracking_id.clone(),
            update: update.clone(),
        }));
        Ok(Some(update))
    }

    /// Current status of every member, optionally limited to one operator
    pub fn status_snapshot(
        &self,
        operator_id: Option<&ChargingStationOperatorId>,
    ) -> BTreeMap<ChargingStationId, ChargingStationStatusTypes> {
        self.stations
            .iter()
            .filter(|entry| operator_id.map_or(true, |op| &entry.operator_id == op))
            .map(|entry| (entry.key().clone(), entry.status().value))
            .collect()
    }

    /// What changed for `operator_id`'s stations since `previous` was taken
    pub fn status_diff(
        &self,
        operator_id: ChargingStationOperatorId,
        previous: &BTreeMap<ChargingStationId, ChargingStationStatusTypes>,
    ) -> StatusDiff<ChargingStationOperatorId, ChargingStationId, ChargingStationStatusTypes> {
        let current = self.status_snapshot(Some(&operator_id));
        StatusDiff::compute(operator_id, previous, &current)
    }

    pub fn generate_status_report(
        &self,
        timestamp: Option<DateTime<Utc>>,
    ) -> StatusReport<ChargingStation, ChargingStationStatusTypes> {
        let stations = self.stations();
        StatusReport::generate(&stations, |s: &ChargingStation| s.status().value, timestamp)
            .with_context(STATUS_REPORT_CONTEXT)
    }

    pub fn generate_admin_status_report(
        &self,
        timestamp: Option<DateTime<Utc>>,
    ) -> StatusReport<ChargingStation, ChargingStationAdminStatusTypes> {
        let stations = self.stations();
        StatusReport::generate(&stations, |s: &ChargingStation| s.admin_status().value, timestamp)
            .with_context(ADMIN_STATUS_REPORT_CONTEXT)
    }

    pub fn status_history_json(&self, window: HistoryWindow) -> Value {
        let stations = self.stations();
        status_history_json(stations.iter().map(|s| (&s.id, s.status_schedule())), window)
    }

    pub fn admin_status_history_json(&self, window: HistoryWindow) -> Value {
        let stations = self.stations();
        status_history_json(stations.iter().map(|s| (&s.id, s.admin_status_schedule())), window)
    }

    fn refresh_status(&self, event_tracking_id: &EventTrackingId) -> DomainResult<()> {
        let statuses: Vec<_> = self.stations.iter().map(|entry| entry.status().value).collect();
        let derived = derive_group_status(&statuses);

        let mut schedule = self.status.write().unwrap_or_else(PoisonError::into_inner);
        schedule.insert(derived, Utc::now(), event_tracking_id, Some(GROUP_DATA_SOURCE))?;
        Ok(())
    }

    fn publish_admin_update(
        &self,
        event_tracking_id: &EventTrackingId,
        update: StatusUpdate<ChargingStationId, ChargingStationAdminStatusTypes>,
    ) {
        self.publish(Event::ChargingStationAdminStatusChanged(ChargingStationAdminStatusChangedEvent {
            group_id: self.id.clone(),
            event_tracking_id: event_tracking_id.clone(),
            update,
        }));
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

fn not_found(id: &ChargingStationId) -> DomainError {
    DomainError::NotFound {
        entity: "ChargingStation",
        id: id.to_string(),
    }
}

/// Group status from its members' statuses; `Unknown` while no member
/// status is known, including for an empty group.
fn derive_group_status(statuses: &[ChargingStationStatusTypes]) -> ChargingStationGroupStatusTypes {
    use ChargingStationStatusTypes as Station;

    let known: Vec<_> = statuses
        .iter()
        .filter(|status| **status != Station::Unknown)
        .collect();
    if known.is_empty() {
        ChargingStationGroupStatusTypes::Unknown
    } else if known.iter().all(|status| **status == Station::Available) {
        ChargingStationGroupStatusTypes::Available
    } else if known.iter().any(|status| {
        matches!(status, Station::Available | Station::PartiallyAvailable | Station::Charging)
    }) {
        ChargingStationGroupStatusTypes::PartiallyAvailable
    } else if known.iter().all(|status| **status == Station::Faulted) {
        ChargingStationGroupStatusTypes::Faulted
    } else {
        ChargingStationGroupStatusTypes::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::{create_event_bus, Vote};
    use crate::support::HandlerError;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn group() -> ChargingStationGroup {
        ChargingStationGroup::new("G1".parse().unwrap(), &StatusConfig::default()).unwrap()
    }

    fn station(id: &str, operator: &str) -> ChargingStation {
        ChargingStation::new(id.parse().unwrap(), operator.parse().unwrap())
    }

    fn sid(id: &str) -> ChargingStationId {
        id.parse().unwrap()
    }

    #[test]
    fn add_station_success_and_duplicate() {
        let group = group().with_name("Depot");
        let etid = EventTrackingId::new();

        let added = group.add_station(station("S1", "OP"), &etid).unwrap();
        assert_eq!(added.result, PushDataResultTypes::Success);
        assert!(added.runtime.is_some());
        assert!(group.contains_station(&sid("S1")));
        assert_eq!(group.name(), Some("Depot"));

        let duplicate = group.add_station(station("S1", "OP"), &etid).unwrap();
        assert_eq!(duplicate.result, PushDataResultTypes::ArgumentError);
        assert!(duplicate.description.unwrap().contains("already a member"));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn voters_see_the_group_and_can_veto() {
        let group = group();
        let blocked: ChargingStationOperatorId = "EVIL".parse().unwrap();
        group.on_station_addition().on_vote(move |_, sender: &ChargingStationGroup, candidate: &ChargingStation| {
            assert_eq!(sender.id().as_str(), "G1");
            Ok(Vote::from(candidate.operator_id != blocked))
        });
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        group.on_station_addition().on_notification(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let etid = EventTrackingId::new();
        let vetoed = group.add_station(station("S1", "EVIL"), &etid).unwrap();
        assert_eq!(vetoed.result, PushDataResultTypes::Error);
        assert!(!group.contains_station(&sid("S1")));
        assert_eq!(notified.load(Ordering::SeqCst), 0);

        let ok = group.add_station(station("S2", "GOOD"), &etid).unwrap();
        assert_eq!(ok.result, PushDataResultTypes::Success);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_notification_rolls_back_addition() {
        let group = group();
        group
            .on_station_addition()
            .on_notification(|_, _, _| Err(HandlerError::new("roaming index unavailable")));

        let result = group.add_station(station("S1", "OP"), &EventTrackingId::new());
        let err = result.err().unwrap();
        assert!(err.is_subscriber_error());
        assert!(group.is_empty());
    }

    #[test]
    fn notifiers_can_read_the_group() {
        let group = group();
        group.on_station_addition().on_notification(|_, sender: &ChargingStationGroup, added: &ChargingStation| {
            assert!(sender.contains_station(&added.id));
            Ok(())
        });
        let result = group.add_station(station("S1", "OP"), &EventTrackingId::new()).unwrap();
        assert!(result.is_success());
    }

    #[test]
    fn batch_addition_is_partial_when_some_fail() {
        let group = group();
        group
            .on_station_addition()
            .on_vote(|_, _, candidate: &ChargingStation| Ok(Vote::from(candidate.id.as_str() != "S2")));

        let result = group
            .add_stations(
                vec![station("S1", "OP"), station("S2", "OP"), station("S3", "OP")],
                &EventTrackingId::new(),
            )
            .unwrap();

        assert_eq!(result.result, PushDataResultTypes::Partial);
        assert_eq!(result.successful.len(), 2);
        assert_eq!(result.rejected_ids().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["S2"]);
        assert_eq!(group.station_ids(), vec![sid("S1"), sid("S3")]);
    }

    #[test]
    fn remove_station_outcomes() {
        let group = group();
        let etid = EventTrackingId::new();
        group.add_station(station("S1", "OP"), &etid).unwrap();
        group.add_station(station("S2", "OP"), &etid).unwrap();
        group
            .on_station_removal()
            .on_vote(|_, _, candidate: &ChargingStation| Ok(Vote::from(candidate.id.as_str() != "S2")));

        let missing = group.remove_station(&sid("S9"), &etid).unwrap();
        assert_eq!(missing.result, PushDataResultTypes::NoOperation);
        assert!(missing.entity.is_none());

        let vetoed = group.remove_station(&sid("S2"), &etid).unwrap();
        assert_eq!(vetoed.result, PushDataResultTypes::Error);
        assert!(group.contains_station(&sid("S2")));

        let removed = group.remove_station(&sid("S1"), &etid).unwrap();
        assert_eq!(removed.result, PushDataResultTypes::Success);
        assert_eq!(removed.entity.unwrap().id, sid("S1"));
        assert!(!group.contains_station(&sid("S1")));
    }

    #[test]
    fn failing_removal_notification_restores_station() {
        let group = group();
        let etid = EventTrackingId::new();
        group.add_station(station("S1", "OP"), &etid).unwrap();
        group
            .on_station_removal()
            .on_notification(|_, _, _| Err(HandlerError::new("audit log full")));

        assert!(group.remove_station(&sid("S1"), &etid).is_err());
        assert!(group.contains_station(&sid("S1")));
    }

    #[test]
    fn station_status_changes_publish_and_derive_group_status() {
        let bus = create_event_bus(16);
        let mut events = bus.subscribe();
        let group = group().with_event_bus(bus.clone());
        let etid = EventTrackingId::new();

        group.add_station(station("S1", "OP"), &etid).unwrap();
        group.add_station(station("S2", "OP"), &etid).unwrap();
        assert_eq!(group.status().value, ChargingStationGroupStatusTypes::Unknown);

        let update = group
            .set_station_status(&sid("S1"), ChargingStationStatusTypes::Available, at(0), &etid, Some("ocpp"))
            .unwrap()
            .unwrap();
        assert_eq!(update.id, sid("S1"));
        assert_eq!(group.status().value, ChargingStationGroupStatusTypes::Available);

        group
            .set_station_status(&sid("S2"), ChargingStationStatusTypes::Faulted, at(1), &etid, None)
            .unwrap();
        assert_eq!(group.status().value, ChargingStationGroupStatusTypes::PartiallyAvailable);

        assert!(group
            .set_station_status(&sid("S2"), ChargingStationStatusTypes::Faulted, at(2), &etid, None)
            .unwrap()
            .is_none());

        let types: Vec<_> = std::iter::from_fn(|| events.try_recv())
            .map(|message| message.event.event_type())
            .collect();
        assert_eq!(
            types,
            vec![
                "charging_station_added",
                "charging_station_added",
                "charging_station_status_changed",
                "charging_station_status_changed",
            ]
        );

        let err = group
            .set_station_status(&sid("S9"), ChargingStationStatusTypes::Faulted, at(3), &etid, None)
            .err()
            .unwrap();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn admin_status_cascades_and_blocks_membership_changes() {
        let group = group();
        let etid = EventTrackingId::new();
        group.add_station(station("S1", "OP"), &etid).unwrap();
        group.add_station(station("S2", "OP"), &etid).unwrap();

        let update = group
            .set_admin_status(ChargingStationGroupAdminStatusTypes::OutOfService, at(0), &etid)
            .unwrap()
            .unwrap();
        assert_eq!(update.new_status.value, ChargingStationGroupAdminStatusTypes::OutOfService);
        assert!(group
            .set_admin_status(ChargingStationGroupAdminStatusTypes::OutOfService, at(1), &etid)
            .unwrap()
            .is_none());

        for station in group.stations() {
            assert_eq!(station.admin_status().value, ChargingStationAdminStatusTypes::OutOfService);
        }

        let refused = group.add_station(station("S3", "OP"), &etid).unwrap();
        assert_eq!(refused.result, PushDataResultTypes::AdminDown);
        let refused = group.remove_station(&sid("S1"), &etid).unwrap();
        assert_eq!(refused.result, PushDataResultTypes::AdminDown);

        let report = group.generate_admin_status_report(Some(at(5)));
        assert_eq!(report.count(&ChargingStationAdminStatusTypes::OutOfService), 2);
        assert_eq!(report.context(), ADMIN_STATUS_REPORT_CONTEXT);
        assert_eq!(group.admin_status_history(None).len(), 1);
    }

    #[test]
    fn snapshots_diffs_reports_and_history() {
        let group = group();
        let etid = EventTrackingId::new();
        for (id, op) in [("S1", "OP"), ("S2", "OP"), ("S3", "OTHER")] {
            group.add_station(station(id, op), &etid).unwrap();
        }
        group
            .set_station_status(&sid("S1"), ChargingStationStatusTypes::Available, at(0), &etid, None)
            .unwrap();
        group
            .set_station_status(&sid("S2"), ChargingStationStatusTypes::Available, at(0), &etid, None)
            .unwrap();

        let op: ChargingStationOperatorId = "OP".parse().unwrap();
        let before = group.status_snapshot(Some(&op));
        assert_eq!(before.len(), 2);

        group
            .set_station_status(&sid("S2"), ChargingStationStatusTypes::Charging, at(60), &etid, None)
            .unwrap();
        group.remove_station(&sid("S1"), &etid).unwrap();
        group.add_station(station("S4", "OP"), &etid).unwrap();

        let diff = group.status_diff(op.clone(), &before);
        assert_eq!(diff.operator_id(), &op);
        assert_eq!(
            diff.changed_statuses().get(&sid("S2")),
            Some(&ChargingStationStatusTypes::Charging)
        );
        assert!(diff.removed_ids().contains(&sid("S1")));
        assert_eq!(
            diff.new_statuses().get(&sid("S4")),
            Some(&ChargingStationStatusTypes::Unknown)
        );

        let report = group.generate_status_report(None);
        assert_eq!(report.total(), 3);
        assert_eq!(report.count(&ChargingStationStatusTypes::Unknown), 2);
        assert_eq!(report.to_json()["@context"], STATUS_REPORT_CONTEXT);

        let history = group.status_history_json(HistoryWindow::all());
        let object = history.as_object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["S2", "S3", "S4"]);
        assert_eq!(object["S2"].as_object().unwrap().len(), 2);
        assert!(object["S3"].as_object().unwrap().is_empty());

        let admin = group.admin_status_history_json(HistoryWindow {
            skip: 0,
            take: Some(1),
            history_size: None,
        });
        assert_eq!(admin.as_object().unwrap().len(), 1);
    }

    #[test]
    fn group_status_derivation() {
        use ChargingStationGroupStatusTypes as Group;
        use ChargingStationStatusTypes as S;
        assert_eq!(derive_group_status(&[]), Group::Unknown);
        assert_eq!(derive_group_status(&[S::Unknown]), Group::Unknown);
        assert_eq!(derive_group_status(&[S::Available, S::Unknown]), Group::Available);
        assert_eq!(derive_group_status(&[S::Charging, S::Offline]), Group::PartiallyAvailable);
        assert_eq!(derive_group_status(&[S::Faulted, S::Faulted]), Group::Faulted);
        assert_eq!(derive_group_status(&[S::Faulted, S::OutOfService]), Group::Offline);
    }

    #[test]
    fn emptied_group_forgets_derived_status() {
        let group = group();
        let etid = EventTrackingId::new();
        group.add_station(station("S1", "OP"), &etid).unwrap();
        group
            .set_station_status(&sid("S1"), ChargingStationStatusTypes::Available, at(0), &etid, None)
            .unwrap();
        assert_eq!(group.status().value, ChargingStationGroupStatusTypes::Available);

        group.remove_station(&sid("S1"), &etid).unwrap();
        assert!(group.is_empty());
        assert_eq!(group.status().value, ChargingStationGroupStatusTypes::Unknown);
        assert_eq!(group.status_history(None).len(), 2);
    }

    #[test]
    fn batch_addition_survives_failing_notification() {
        let group = group();
        group.on_station_addition().on_notification(|_, _, added: &ChargingStation| {
            if added.id.as_str() == "S2" {
                Err(HandlerError::new("roaming index unavailable"))
            } else {
                Ok(())
            }
        });

        let result = group
            .add_stations(
                vec![station("S1", "OP"), station("S2", "OP"), station("S3", "OP")],
                &EventTrackingId::new(),
            )
            .unwrap();

        assert_eq!(result.result, PushDataResultTypes::Partial);
        assert_eq!(result.successful.len(), 2);
        assert_eq!(result.rejected_ids().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["S2"]);
        assert_eq!(result.rejected[0].result, PushDataResultTypes::Error);
        assert!(result.rejected[0]
            .description
            .as_deref()
            .unwrap()
            .contains("roaming index unavailable"));
        assert_eq!(group.station_ids(), vec![sid("S1"), sid("S3")]);
    }

    #[test]
    fn concurrent_adds_of_one_station_admit_exactly_one() {
        const THREADS: usize = 8;

        let group = Arc::new(group());
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let group = Arc::clone(&group);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    group
                        .add_station(station("S1", "OP"), &EventTrackingId::new())
                        .unwrap()
                        .result
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
        let successes = outcomes
            .iter()
            .filter(|result| **result == PushDataResultTypes::Success)
            .count();
        assert_eq!(successes, 1);
        assert!(outcomes
            .iter()
            .all(|result| matches!(result, PushDataResultTypes::Success | PushDataResultTypes::ArgumentError)));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn group_and_notificator_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChargingStationGroup>();
        assert_send_sync::<StationVotingNotificator>();
        assert_send_sync::<VotingNotificator<ChargingStationGroup, ChargingStation>>();
    }

    #[test]
    fn zero_sized_config_is_rejected() {
        let config = StatusConfig {
            max_status_schedule_size: 0,
            max_admin_status_schedule_size: 15,
        };
        assert!(ChargingStationGroup::new("G1".parse().unwrap(), &config).is_err());
    }
}
