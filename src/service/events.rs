use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::usermodel::UserRole;

const ROOM_CAPACITY: usize = 64;

/// One event as delivered to room subscribers. Best-effort: no ordering
/// across rooms, no persistence, no redelivery. Clients that miss events
/// reconcile by re-fetching the booking.
#[derive(Debug, Clone, Serialize)]
pub struct RoomEvent {
    pub event: String,
    pub payload: Value,
}

pub fn user_room(user_id: Uuid) -> String {
    format!("user_{}", user_id)
}

pub fn role_room(role: UserRole) -> String {
    format!("role_{}", role.to_str())
}

pub fn booking_room(booking_id: Uuid) -> String {
    format!("booking_{}", booking_id)
}

/// Room-addressed broadcaster for lifecycle, negotiation and location
/// events. Rooms are created on first subscribe and dropped once the last
/// receiver is gone.
#[derive(Debug)]
pub struct EventBroadcaster {
    rooms: RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    pub async fn subscribe(&self, room: &str) -> broadcast::Receiver<RoomEvent> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Fire-and-forget publish. A room with no listeners is not an error;
    /// the durable state was already written before this is called.
    pub async fn publish(&self, room: &str, event: &str, payload: Value) {
        let stale = {
            let rooms = self.rooms.read().await;
            match rooms.get(room) {
                Some(sender) => {
                    if sender.receiver_count() == 0 {
                        true
                    } else {
                        let _ = sender.send(RoomEvent {
                            event: event.to_string(),
                            payload,
                        });
                        tracing::debug!("event {} published to room {}", event, room);
                        false
                    }
                }
                None => {
                    tracing::debug!("event {} dropped, no room {}", event, room);
                    false
                }
            }
        };

        if stale {
            let mut rooms = self.rooms.write().await;
            if rooms
                .get(room)
                .map(|s| s.receiver_count() == 0)
                .unwrap_or(false)
            {
                rooms.remove(room);
            }
        }
    }

    #[cfg(test)]
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn room_names_follow_the_addressing_scheme() {
        let id = Uuid::parse_str("7f2c1a90-6b6e-4a9f-9f8e-0d34c1f9b6aa").unwrap();
        assert_eq!(user_room(id), format!("user_{}", id));
        assert_eq!(booking_room(id), format!("booking_{}", id));
        assert_eq!(role_room(UserRole::Provider), "role_provider");
        assert_eq!(role_room(UserRole::Customer), "role_customer");
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBroadcaster::new();
        let mut rx = bus.subscribe("booking_1").await;

        bus.publish("booking_1", "booking:status-changed", json!({"status": "accepted"}))
            .await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, "booking:status-changed");
        assert_eq!(event.payload["status"], "accepted");
    }

    #[tokio::test]
    async fn publish_to_missing_room_is_a_no_op() {
        let bus = EventBroadcaster::new();
        bus.publish("booking_none", "booking:notification", json!({}))
            .await;
        assert_eq!(bus.room_count().await, 0);
    }

    #[tokio::test]
    async fn events_do_not_cross_rooms() {
        let bus = EventBroadcaster::new();
        let mut rx_a = bus.subscribe("booking_a").await;
        let _rx_b = bus.subscribe("booking_b").await;

        bus.publish("booking_b", "chat:message", json!({"message": "hi"}))
            .await;
        bus.publish("booking_a", "chat:message", json!({"message": "yo"}))
            .await;

        let event = rx_a.recv().await.unwrap();
        assert_eq!(event.payload["message"], "yo");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn abandoned_rooms_are_dropped_on_publish() {
        let bus = EventBroadcaster::new();
        {
            let _rx = bus.subscribe("booking_gone").await;
        }
        bus.publish("booking_gone", "booking:notification", json!({}))
            .await;
        assert_eq!(bus.room_count().await, 0);
    }
}
