use devhub_proto::entities::{Notification, NotificationPatch};

use crate::cache::Cache;

/// Notifications of the signed-in user, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    notifications: Cache<Notification>,
}

impl NotificationStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Cache<Notification> {
        &self.notifications
    }

    /// Mutable access to the underlying cache.
    pub fn cache_mut(&mut self) -> &mut Cache<Notification> {
        &mut self.notifications
    }

    /// Append unless already present.
    pub fn add(&mut self, notification: Notification) -> bool {
        self.notifications.add(notification)
    }

    /// Drop one notification.
    pub fn remove(&mut self, id: &str) -> Option<Notification> {
        self.notifications.remove(id)
    }

    /// Mark one notification read at `now` (RFC 3339).
    ///
    /// An existing `read_at` is kept.
    pub fn mark_read(&mut self, id: &str, now: &str) -> bool {
        let Some(existing) = self.notifications.get(id) else {
            return false;
        };
        let read_at = existing.read_at.clone().unwrap_or_else(|| now.to_string());
        self.notifications.update(id, NotificationPatch {
            is_read: Some(true),
            read_at: Some(read_at),
            ..NotificationPatch::default()
        })
    }

    /// Mark every notification read. Returns how many changed.
    pub fn mark_all_read(&mut self, now: &str) -> usize {
        let mut changed = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.is_read) {
            notification.is_read = true;
            notification.read_at.get_or_insert_with(|| now.to_string());
            changed += 1;
        }
        changed
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    /// Notifications newest first, for display.
    pub fn newest_first(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().rev()
    }

    /// Notification by id.
    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.notifications.get(id)
    }

    /// Number of cached notifications.
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Drop everything (logout).
    pub fn clear(&mut self) {
        self.notifications.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn notification(id: &str) -> Notification {
        serde_json::from_value(json!({"id": id, "title": id})).unwrap()
    }

    #[test]
    fn mark_read_keeps_existing_timestamp() {
        let mut store = NotificationStore::new();
        let mut seen = notification("a");
        seen.read_at = Some("2024-01-01T00:00:00Z".to_string());
        store.add(seen);
        store.add(notification("b"));

        assert!(store.mark_read("a", "2024-06-01T00:00:00Z"));
        assert!(store.mark_read("b", "2024-06-01T00:00:00Z"));
        assert!(!store.mark_read("missing", "2024-06-01T00:00:00Z"));

        assert_eq!(store.get("a").unwrap().read_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(store.get("b").unwrap().read_at.as_deref(), Some("2024-06-01T00:00:00Z"));
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn mark_all_read_counts_changes() {
        let mut store = NotificationStore::new();
        for id in ["a", "b", "c"] {
            store.add(notification(id));
        }
        store.mark_read("b", "now");

        assert_eq!(store.unread_count(), 2);
        assert_eq!(store.mark_all_read("later"), 2);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn newest_first_reverses_arrival() {
        let mut store = NotificationStore::new();
        store.add(notification("old"));
        store.add(notification("new"));

        let ids: Vec<_> = store.newest_first().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }
}
