//! Event types and the broadcast EventBus
//!
//! Live delivery backbone for the matching subsystem. Persistence always
//! happens first; events only carry the "push" side, so a missing
//! subscriber loses nothing durable.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Notification;

/// Events broadcast by the matching subsystem.
///
/// Serialized with a `type` tag so transport layers (SSE, websockets) can
/// route without deserializing the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RefoundEvent {
    /// A persisted notification ready for live delivery.
    ///
    /// The transport layer routes this to the `user_id` channel; everyone
    /// else ignores it.
    MatchNotification {
        /// Recipient user
        user_id: Uuid,
        /// The already-persisted notification row
        notification: Notification,
        /// When the forward happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One side of a match confirmed it.
    MatchConfirmed {
        /// Match being confirmed
        match_id: Uuid,
        /// User who confirmed
        user_id: Uuid,
        /// Whether this confirmation completed the match
        fully_confirmed: bool,
        /// When confirmation was persisted
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Both sides confirmed; the resolution cascade ran.
    MatchResolved {
        /// Match that was resolved (record already deleted)
        match_id: Uuid,
        /// The two items marked resolved
        item1_id: Uuid,
        item2_id: Uuid,
        /// When the cascade finished
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl RefoundEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            RefoundEvent::MatchNotification { .. } => "MatchNotification",
            RefoundEvent::MatchConfirmed { .. } => "MatchConfirmed",
            RefoundEvent::MatchResolved { .. } => "MatchResolved",
        }
    }
}

/// Central event distribution bus
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
///
/// # Examples
///
/// ```
/// use refound_common::events::{EventBus, RefoundEvent};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(RefoundEvent::MatchResolved {
///     match_id: uuid::Uuid::new_v4(),
///     item1_id: uuid::Uuid::new_v4(),
///     item2_id: uuid::Uuid::new_v4(),
///     timestamp: chrono::Utc::now(),
/// });
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RefoundEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity.
    ///
    /// Older events are dropped for subscribers that fall more than
    /// `capacity` events behind.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events. Events emitted before subscription
    /// are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<RefoundEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: RefoundEvent,
    ) -> Result<usize, broadcast::error::SendError<RefoundEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening.
    ///
    /// The right call for fire-and-forget pushes: delivery to zero
    /// subscribers is normal operation, not an error.
    pub fn emit_lossy(&self, event: RefoundEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, ItemKind, Notification};

    fn sample_notification() -> Notification {
        let counterpart = Item::new(
            Uuid::new_v4(),
            ItemKind::Found,
            "blue backpack".into(),
            "http://localhost/items/b.jpg".into(),
        );
        Notification::match_found(
            Uuid::new_v4(),
            Uuid::new_v4(),
            ItemKind::Lost,
            &counterpart,
            82,
        )
    }

    #[test]
    fn new_bus_has_capacity_and_no_subscribers() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn subscribe_increments_count() {
        let bus = EventBus::new(10);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn emit_delivers_to_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        let notification = sample_notification();
        let user_id = notification.user_id;
        bus.emit(RefoundEvent::MatchNotification {
            user_id,
            notification,
            timestamp: chrono::Utc::now(),
        })
        .expect("emit should succeed with a subscriber");

        let received = rx.try_recv().expect("should receive event");
        assert_eq!(received.event_type(), "MatchNotification");
        match received {
            RefoundEvent::MatchNotification { user_id: got, .. } => assert_eq!(got, user_id),
            other => panic!("wrong event: {:?}", other.event_type()),
        }
    }

    #[test]
    fn emit_without_subscribers_is_err_but_lossy_is_silent() {
        let bus = EventBus::new(10);

        let event = RefoundEvent::MatchConfirmed {
            match_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            fully_confirmed: false,
            timestamp: chrono::Utc::now(),
        };
        assert!(bus.emit(event.clone()).is_err());
        bus.emit_lossy(event);
    }

    #[test]
    fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit_lossy(RefoundEvent::MatchResolved {
            match_id: Uuid::new_v4(),
            item1_id: Uuid::new_v4(),
            item2_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
        });

        assert_eq!(rx1.try_recv().unwrap().event_type(), "MatchResolved");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "MatchResolved");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = RefoundEvent::MatchConfirmed {
            match_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            fully_confirmed: true,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"MatchConfirmed\""));
        assert!(json.contains("\"fully_confirmed\":true"));

        let back: RefoundEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type(), "MatchConfirmed");
    }
}
