//! Application events
//!
//! - `voting`: synchronous vote-then-notify hooks owned by aggregates
//! - `event_bus`: broadcast channel for observers outside the aggregate
//!
//! Event types are defined in `domain::events`.

pub mod event_bus;
pub mod voting;

pub use crate::domain::events::types;
pub use crate::domain::events::types::*;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use voting::{VetoVote, Vote, VoteAggregator, VotingNotificator, VotingOutcome};
