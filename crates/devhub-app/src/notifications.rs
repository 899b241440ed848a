//! Notification feed of the signed-in user.

use devhub_core::store::NotificationStore;
use devhub_proto::{InboundEvent, entities::Notification};

/// Notifications fed by REST loads and `notification_created` events.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    store: NotificationStore,
}

impl NotificationFeed {
    /// Empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feed with a fetched list.
    pub fn seed(&mut self, notifications: Vec<Notification>) {
        self.store.cache_mut().set_all(notifications);
    }

    /// Apply a realtime event. Only `notification_created` has an effect.
    pub fn apply(&mut self, event: InboundEvent) -> bool {
        match event {
            InboundEvent::NotificationCreated(notification) => {
                tracing::debug!(id = %notification.id, kind = %notification.kind, "notification received");
                self.store.add(notification)
            },
            _ => false,
        }
    }

    /// Mark one notification read at `now` (RFC 3339).
    pub fn mark_read(&mut self, id: &str, now: &str) -> bool {
        self.store.mark_read(id, now)
    }

    /// Mark everything read at `now` (RFC 3339). Returns how many changed.
    pub fn mark_all_read(&mut self, now: &str) -> usize {
        self.store.mark_all_read(now)
    }

    /// Unread badge count.
    pub fn unread_count(&self) -> usize {
        self.store.unread_count()
    }

    /// Underlying store.
    pub fn store(&self) -> &NotificationStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn notification(id: &str) -> Notification {
        serde_json::from_value(json!({"id": id, "title": "Mentioned", "type": "mention"})).unwrap()
    }

    #[test]
    fn created_event_adds_unread() {
        let mut feed = NotificationFeed::new();
        feed.seed(vec![notification("n1")]);

        assert!(feed.apply(InboundEvent::NotificationCreated(notification("n2"))));
        assert!(!feed.apply(InboundEvent::NotificationCreated(notification("n2"))));
        assert_eq!(feed.unread_count(), 2);

        assert!(feed.mark_read("n1", "2024-01-01T00:00:00Z"));
        assert_eq!(feed.unread_count(), 1);
    }

    #[test]
    fn chat_events_are_ignored() {
        let mut feed = NotificationFeed::new();
        let event = InboundEvent::Unknown { kind: "made_up_event".into() };

        assert!(!feed.apply(event));
        assert!(feed.store().is_empty());
    }
}
