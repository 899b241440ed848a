use std::collections::{HashMap, HashSet};

use devhub_proto::entities::{Message, MessagePatch, ReactionGroup};

use crate::cache::Cache;

/// Messages of the topic currently on screen, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Cache<Message>,
}

impl MessageStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Cache<Message> {
        &self.messages
    }

    /// Mutable access to the underlying cache.
    pub fn cache_mut(&mut self) -> &mut Cache<Message> {
        &mut self.messages
    }

    /// Seed from a REST page, which the server returns newest first.
    pub fn seed_page(&mut self, page: Vec<Message>) {
        self.messages.set_all(page.into_iter().rev());
    }

    /// Append a realtime message unless already present.
    pub fn add(&mut self, message: Message) -> bool {
        self.messages.add(message)
    }

    /// Merge fields into a cached message.
    pub fn update(&mut self, id: &str, patch: MessagePatch) -> bool {
        self.messages.update(id, patch)
    }

    /// Drop a message.
    pub fn remove(&mut self, id: &str) -> Option<Message> {
        self.messages.remove(id)
    }

    /// Replace the reaction groups of a message.
    pub fn set_reactions(&mut self, id: &str, reactions: Vec<ReactionGroup>) -> bool {
        self.messages.update(id, MessagePatch::reactions(reactions))
    }

    /// Drop everything (topic switch).
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Message by id.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Messages in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Number of cached messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no messages are cached.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Walk `parent_id` links up to the outermost cached ancestor.
    pub fn thread_root<'a>(&'a self, message: &'a Message) -> &'a Message {
        let mut current = message;
        let mut seen = HashSet::new();
        while let Some(parent) = current.parent_id.as_deref().and_then(|id| self.messages.get(id)) {
            if !seen.insert(parent.id.as_str()) {
                break;
            }
            current = parent;
        }
        current
    }

    /// Replies below `root_id`, depth first, siblings by creation time.
    pub fn thread(&self, root_id: &str) -> Vec<&Message> {
        let mut children: HashMap<&str, Vec<&Message>> = HashMap::new();
        for message in self.messages.iter() {
            if let Some(parent) = message.parent_id.as_deref() {
                children.entry(parent).or_default().push(message);
            }
        }
        for siblings in children.values_mut() {
            // RFC 3339 timestamps from one server sort lexicographically.
            siblings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }

        let mut out = Vec::new();
        let mut visited = HashSet::from([root_id]);
        let mut stack: Vec<&Message> =
            children.get(root_id).map(|c| c.iter().rev().copied().collect()).unwrap_or_default();

        while let Some(message) = stack.pop() {
            if !visited.insert(message.id.as_str()) {
                continue;
            }
            out.push(message);
            if let Some(replies) = children.get(message.id.as_str()) {
                stack.extend(replies.iter().rev().copied());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, parent: Option<&str>, at: &str) -> Message {
        let mut message = Message::text(id, "t", id);
        message.parent_id = parent.map(str::to_string);
        message.created_at = at.to_string();
        message
    }

    #[test]
    fn seed_page_reverses_newest_first() {
        let mut store = MessageStore::new();
        store.add(Message::text("stale", "t", "x"));
        store.seed_page(vec![msg("3", None, "c"), msg("2", None, "b"), msg("1", None, "a")]);

        let ids: Vec<_> = store.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn thread_is_depth_first_and_chronological() {
        let mut store = MessageStore::new();
        store.cache_mut().set_all(vec![
            msg("root", None, "2024-01-01T00:00:00Z"),
            msg("b", Some("root"), "2024-01-01T00:02:00Z"),
            msg("a", Some("root"), "2024-01-01T00:01:00Z"),
            msg("a1", Some("a"), "2024-01-01T00:03:00Z"),
            msg("other", None, "2024-01-01T00:04:00Z"),
        ]);

        let ids: Vec<_> = store.thread("root").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "b"]);

        let reply = store.get("a1").unwrap();
        assert_eq!(store.thread_root(reply).id, "root");
    }

    #[test]
    fn cyclic_parents_terminate() {
        let mut store = MessageStore::new();
        store.cache_mut().set_all(vec![msg("x", Some("y"), "1"), msg("y", Some("x"), "2")]);

        assert_eq!(store.thread("x").len(), 1);
        let x = store.get("x").unwrap();
        let _ = store.thread_root(x);
    }

    #[test]
    fn set_reactions_replaces_groups() {
        let mut store = MessageStore::new();
        store.add(Message::text("1", "t", "hi"));
        let groups = vec![ReactionGroup { emoji: "👍".into(), count: 2, users: vec![], has_self: false }];

        assert!(store.set_reactions("1", groups.clone()));
        assert_eq!(store.get("1").unwrap().reactions, Some(groups));
        assert_eq!(store.get("1").unwrap().content, "hi");
    }
}
