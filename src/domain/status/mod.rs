//! Generic status tracking shared by every entity type
//!
//! - [`StatusValue`] / [`Timestamped`]: immutable observations
//! - [`StatusSchedule`]: bounded per-entity history with change handlers
//! - [`StatusUpdate`]: transitions pushed to upstream systems
//! - [`StatusDiff`]: delta between two snapshots
//! - [`StatusReport`]: histogram over a collection of entities

pub mod diff;
pub mod json;
pub mod report;
pub mod schedule;
pub mod types;
pub mod update;
pub mod value;

pub use diff::{status_snapshot, StatusDiff};
pub use json::{schedule_json, status_history_json, HistoryWindow};
pub use report::{StatusReport, DEFAULT_STATUS_REPORT_CONTEXT};
pub use schedule::{
    StatusChange, StatusChangedHandler, StatusSchedule, DEFAULT_MAX_STATUS_SCHEDULE_SIZE,
};
pub use types::{
    ChargingStationAdminStatusTypes, ChargingStationGroupAdminStatusTypes,
    ChargingStationGroupStatusTypes, ChargingStationStatusTypes, EnergyMeterAdminStatusTypes,
    EvseAdminStatusTypes, EvseStatusTypes, RoamingNetworkAdminStatusTypes,
    RoamingNetworkStatusTypes, StatusType,
};
pub use update::StatusUpdate;
pub use value::{StatusValue, Timestamped};
