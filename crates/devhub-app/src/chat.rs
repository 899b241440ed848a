//! Chat view of one topic.

use std::{ops::Sub, time::Duration};

use devhub_core::store::MessageStore;
use devhub_proto::{InboundEvent, entities::Message};

use crate::typing::TypingIndicators;

/// Messages and typing indicators of the open topic.
///
/// Realtime events are only applied while a topic is mounted; events that
/// arrive after [`ChatView::unmount`] are dropped.
#[derive(Debug, Clone)]
pub struct ChatView<I> {
    topic_id: Option<String>,
    messages: MessageStore,
    typing: TypingIndicators<I>,
}

impl<I> Default for ChatView<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I> ChatView<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Empty, unmounted view.
    pub fn new() -> Self {
        Self { topic_id: None, messages: MessageStore::new(), typing: TypingIndicators::new() }
    }

    /// Open `topic_id`, replacing whatever was shown, and seed it with a
    /// newest-first REST page.
    pub fn mount(&mut self, topic_id: &str, page: Vec<Message>) {
        self.unmount();
        self.messages.seed_page(page);
        self.topic_id = Some(topic_id.to_string());
        tracing::debug!(topic_id, messages = self.messages.len(), "chat mounted");
    }

    /// Close the topic and forget its state.
    pub fn unmount(&mut self) {
        self.topic_id = None;
        self.messages.clear();
        self.typing.clear();
    }

    /// Apply a realtime event. Returns whether anything visible changed.
    ///
    /// Notification and control events leave the view untouched.
    pub fn apply(&mut self, event: InboundEvent, now: I) -> bool {
        let Some(topic_id) = self.topic_id.as_deref() else {
            tracing::debug!(kind = event.kind(), "no topic mounted, dropping event");
            return false;
        };

        match event {
            InboundEvent::NewMessage(message) => {
                let id = message.id.clone();
                let added = self.messages.add(message);
                if !added {
                    tracing::debug!(topic_id, %id, "duplicate message ignored");
                }
                added
            },
            InboundEvent::MessageUpdated(change) => {
                let updated = self.messages.update(&change.id, change.patch);
                if !updated {
                    tracing::debug!(topic_id, id = %change.id, "update for unknown message");
                }
                updated
            },
            InboundEvent::MessageDeleted(deleted) => {
                self.messages.remove(&deleted.message_id).is_some()
            },
            InboundEvent::ReactionUpdated(update) => {
                self.messages.set_reactions(&update.message_id, update.reactions)
            },
            InboundEvent::Typing(update) => self.typing.apply(update, now),
            InboundEvent::NotificationCreated(_)
            | InboundEvent::Pong
            | InboundEvent::Unknown { .. } => false,
        }
    }

    /// Expire stale typing indicators. Returns whether any were dropped.
    pub fn expire_typing(&mut self, now: I) -> bool {
        self.typing.expire(now)
    }

    /// Mounted topic.
    pub fn topic_id(&self) -> Option<&str> {
        self.topic_id.as_deref()
    }

    /// Whether a topic is mounted.
    pub fn is_mounted(&self) -> bool {
        self.topic_id.is_some()
    }

    /// Messages, oldest first.
    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    /// Remote typists.
    pub fn typing(&self) -> &TypingIndicators<I> {
        &self.typing
    }
}
