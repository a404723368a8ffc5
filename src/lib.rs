//! # WWCP status core
//!
//! Status tracking and result reporting for e-mobility entities: charging
//! stations, their groups, EVSEs, energy meters and roaming networks.
//!
//! ## Architecture
//!
//! - **domain**: identifiers, status types, bounded status histories,
//!   snapshots and diffs, reports, and the outcome types of push and
//!   entity operations
//! - **application**: vote-then-notify hooks, the broadcast event bus and
//!   the charging station group aggregate
//! - **config**: TOML configuration for history sizes and bus capacity
//! - **support**: errors and subscription handles shared by all layers

pub mod application;
pub mod config;
pub mod domain;
pub mod support;

pub use config::{default_config_path, CoreConfig, StatusConfig};

// Re-export the aggregate and its event plumbing
pub use application::{create_event_bus, ChargingStationGroup, Event, EventBus, SharedEventBus, VotingNotificator};

pub use support::{DomainError, DomainResult, HandlerError, HandlerResult, SubscriptionId};
