//! Application services

mod station_group;

pub use station_group::{
    ChargingStationGroup, StationVotingNotificator, ADMIN_STATUS_REPORT_CONTEXT, STATUS_REPORT_CONTEXT,
};
