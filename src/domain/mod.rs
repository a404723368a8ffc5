pub mod charging_station;
pub mod events;
pub mod ids;
pub mod results;
pub mod status;

// Re-export commonly used types
pub use charging_station::ChargingStation;
pub use ids::{ChargingStationGroupId, ChargingStationId, ChargingStationOperatorId, EventTrackingId};
pub use results::{Entity, EntitiesResult, EntityResult, PushDataResultTypes, PushStatusResult, PushStatusResultTypes};
pub use status::{StatusDiff, StatusReport, StatusSchedule, StatusType, StatusUpdate, StatusValue, Timestamped};

// Re-export DomainError from support for convenience
pub use crate::support::errors::DomainError;
