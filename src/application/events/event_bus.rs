//! Broadcast of group events to observers outside the aggregate

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

use crate::config::EventsConfig;
use crate::domain::events::{Event, EventMessage};

pub const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of [`EventMessage`]s. Slow subscribers lose the oldest
/// messages once `capacity` are buffered.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn from_config(config: &EventsConfig) -> Self {
        Self::with_capacity(config.bus_capacity)
    }

    /// Never blocks; without subscribers the event is dropped.
    pub fn publish(&self, event: Event) {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        let group_id = message.event.group_id().clone();

        let delivered = self.sender.send(message).unwrap_or(0);
        debug!(event_type, group_id = %group_id, subscribers = delivered, "Event published");
    }

    /// Receives every event published from now on
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
}

impl EventSubscriber {
    /// Next event, skipping over lost ones; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(missed)) => warn!(missed, "Event subscriber lagged"),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered event, if any
    pub fn try_recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(missed)) => warn!(missed, "Event subscriber lagged"),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus(capacity: usize) -> SharedEventBus {
    Arc::new(EventBus::with_capacity(capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::ChargingStationRemovedEvent;
    use crate::domain::ids::EventTrackingId;
    use chrono::Utc;
    use std::time::Duration;

    fn removed(station: &str) -> Event {
        Event::ChargingStationRemoved(ChargingStationRemovedEvent {
            group_id: "G1".parse().unwrap(),
            charging_station_id: station.parse().unwrap(),
            event_tracking_id: EventTrackingId::new(),
            timestamp: Utc::now(),
        })
    }

    fn removed_station(message: &EventMessage) -> &str {
        match &message.event {
            Event::ChargingStationRemoved(e) => e.charging_station_id.as_str(),
            other => panic!("unexpected event {}", other.event_type()),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut subscriber = bus.subscribe();

        bus.publish(removed("S1"));

        let received = tokio::time::timeout(Duration::from_millis(100), subscriber.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.event.event_type(), "charging_station_removed");
    }

    #[tokio::test]
    async fn recv_ends_when_bus_is_dropped() {
        let bus = EventBus::with_capacity(2);
        let mut subscriber = bus.subscribe();
        drop(bus);
        assert!(subscriber.recv().await.is_none());
    }

    #[test]
    fn try_recv_drains_in_order_and_skips_lost_events() {
        let bus = EventBus::with_capacity(2);
        let mut subscriber = bus.subscribe();
        assert!(subscriber.try_recv().is_none());

        for station in ["S1", "S2", "S3"] {
            bus.publish(removed(station));
        }

        // S1 fell out of the two-slot buffer
        assert_eq!(removed_station(&subscriber.try_recv().unwrap()), "S2");
        assert_eq!(removed_station(&subscriber.try_recv().unwrap()), "S3");
        assert!(subscriber.try_recv().is_none());
    }

    #[test]
    fn subscriber_count_follows_live_subscribers() {
        let bus = EventBus::from_config(&EventsConfig { bus_capacity: 8 });
        assert_eq!(bus.subscriber_count(), 0);

        let first = bus.subscribe();
        let _second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = create_event_bus(8);
        bus.publish(removed("S1"));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
