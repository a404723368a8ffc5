pub mod events;
pub mod services;

// Re-export key types for convenience
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use events::{VetoVote, Vote, VoteAggregator, VotingNotificator, VotingOutcome};
pub use services::ChargingStationGroup;
