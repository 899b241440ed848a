//! Application state machine.
//!
//! This module defines the [`App`] state machine, which binds realtime events
//! to the caches a page renders from, completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Mounts and unmounts the chat topic, and asks for the matching
//!   subscription.
//! - Routes each realtime event to the containers that care about its tag.
//! - Debounces the local typing indicator and expires remote ones.
//! - Tracks high-level connection status for UI feedback.

use std::{ops::Sub, time::Duration};

use devhub_proto::InboundEvent;

use crate::{
    AppAction, AppEvent, ChatView, ConnectionStatus, NotificationFeed, typing::TypingNotifier,
};

/// Application state machine.
///
/// Generic over the instant type so simulation can drive it with virtual
/// time.
#[derive(Debug, Clone)]
pub struct App<I> {
    /// Realtime status.
    status: ConnectionStatus,
    /// Open topic.
    chat: ChatView<I>,
    /// Notifications of the signed-in user.
    notifications: NotificationFeed,
    /// Outbound typing debounce.
    notifier: TypingNotifier<I>,
    /// Message draft.
    draft: String,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl<I> Default for App<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I> App<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// App with no topic open.
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Offline,
            chat: ChatView::new(),
            notifications: NotificationFeed::new(),
            notifier: TypingNotifier::new(),
            draft: String::new(),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent, now: I) -> Vec<AppAction> {
        match event {
            AppEvent::TopicSelected { topic_id, page } => {
                self.chat.mount(&topic_id, page);
                self.notifier = TypingNotifier::new();
                self.draft.clear();
                self.status = ConnectionStatus::Connecting;
                self.status_message = None;
                vec![AppAction::Connect { topic_id }, AppAction::Render]
            },
            AppEvent::TopicClosed => {
                if !self.chat.is_mounted() {
                    return vec![];
                }
                self.chat.unmount();
                self.notifier = TypingNotifier::new();
                self.draft.clear();
                self.status = ConnectionStatus::Offline;
                vec![AppAction::Disconnect, AppAction::Render]
            },
            AppEvent::NotificationsLoaded(notifications) => {
                self.notifications.seed(notifications);
                vec![AppAction::Render]
            },
            AppEvent::Realtime(event) => {
                if self.route(event, now) {
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
            AppEvent::Connected => {
                self.status = ConnectionStatus::Online;
                self.status_message = None;
                vec![AppAction::Render]
            },
            AppEvent::Disconnected => {
                self.status = if self.chat.is_mounted() {
                    ConnectionStatus::Reconnecting
                } else {
                    ConnectionStatus::Offline
                };
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
            AppEvent::ReconnectExhausted => {
                self.status = ConnectionStatus::GaveUp;
                self.status_message = Some("Connection lost".to_string());
                vec![AppAction::Render]
            },
            AppEvent::InputChanged { text } => {
                self.draft = text;
                let mut actions = Vec::new();
                if self.chat.is_mounted() && self.notifier.input(now) {
                    actions.push(AppAction::SendTyping { is_typing: true });
                }
                actions.push(AppAction::Render);
                actions
            },
            AppEvent::MessageSubmitted => {
                self.draft.clear();
                self.notifier.submit();
                if self.chat.is_mounted() {
                    vec![AppAction::SendTyping { is_typing: false }, AppAction::Render]
                } else {
                    vec![AppAction::Render]
                }
            },
            AppEvent::Tick => {
                let mut actions = Vec::new();
                if self.notifier.tick(now) && self.chat.is_mounted() {
                    actions.push(AppAction::SendTyping { is_typing: false });
                }
                if self.chat.expire_typing(now) {
                    actions.push(AppAction::Render);
                }
                actions
            },
            AppEvent::Shutdown => {
                self.chat.unmount();
                self.status = ConnectionStatus::Offline;
                vec![AppAction::Disconnect, AppAction::Quit]
            },
        }
    }

    /// Send a realtime event to the containers that consume its tag.
    fn route(&mut self, event: InboundEvent, now: I) -> bool {
        match event {
            InboundEvent::NewMessage(_)
            | InboundEvent::MessageUpdated(_)
            | InboundEvent::MessageDeleted(_)
            | InboundEvent::ReactionUpdated(_)
            | InboundEvent::Typing(_) => self.chat.apply(event, now),
            InboundEvent::NotificationCreated(_) => self.notifications.apply(event),
            InboundEvent::Pong => false,
            InboundEvent::Unknown { kind } => {
                tracing::debug!(%kind, "no container for event");
                false
            },
        }
    }

    /// Realtime status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Open topic.
    pub fn chat(&self) -> &ChatView<I> {
        &self.chat
    }

    /// Notifications of the signed-in user.
    pub fn notifications(&self) -> &NotificationFeed {
        &self.notifications
    }

    /// Mutable notifications, for read marks.
    pub fn notifications_mut(&mut self) -> &mut NotificationFeed {
        &mut self.notifications
    }

    /// Current draft.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether the local user is mid-burst.
    pub fn is_typing(&self) -> bool {
        self.notifier.is_typing()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use devhub_proto::{TypingUpdate, entities::Message};

    use super::*;

    fn open_app(now: Instant) -> App<Instant> {
        let mut app = App::new();
        app.handle(
            AppEvent::TopicSelected {
                topic_id: "t1".into(),
                page: vec![Message::text("1", "t1", "hi")],
            },
            now,
        );
        app.handle(AppEvent::Connected, now);
        app
    }

    #[test]
    fn selecting_topic_connects() {
        let mut app = App::new();
        let actions = app.handle(
            AppEvent::TopicSelected { topic_id: "t1".into(), page: vec![] },
            Instant::now(),
        );

        assert_eq!(actions, vec![AppAction::Connect { topic_id: "t1".into() }, AppAction::Render]);
        assert_eq!(app.status(), ConnectionStatus::Connecting);
    }

    #[test]
    fn closing_topic_disconnects_once() {
        let now = Instant::now();
        let mut app = open_app(now);

        assert_eq!(app.handle(AppEvent::TopicClosed, now), vec![
            AppAction::Disconnect,
            AppAction::Render
        ]);
        assert!(app.handle(AppEvent::TopicClosed, now).is_empty());
        assert!(app.chat().messages().is_empty());
    }

    #[test]
    fn drop_then_exhaustion_updates_status() {
        let now = Instant::now();
        let mut app = open_app(now);

        app.handle(AppEvent::Disconnected, now);
        assert_eq!(app.status(), ConnectionStatus::Reconnecting);

        app.handle(AppEvent::ReconnectExhausted, now);
        assert_eq!(app.status(), ConnectionStatus::GaveUp);
        assert_eq!(app.status_message(), Some("Connection lost"));
    }

    #[test]
    fn typing_burst_and_idle() {
        let start = Instant::now();
        let mut app = open_app(start);

        let first = app.handle(AppEvent::InputChanged { text: "h".into() }, start);
        assert_eq!(first[0], AppAction::SendTyping { is_typing: true });

        let second = app.handle(AppEvent::InputChanged { text: "he".into() }, start);
        assert_eq!(second, vec![AppAction::Render]);

        let idle = app.handle(AppEvent::Tick, start + Duration::from_secs(3));
        assert_eq!(idle, vec![AppAction::SendTyping { is_typing: false }]);
    }

    #[test]
    fn submit_stops_typing() {
        let now = Instant::now();
        let mut app = open_app(now);
        app.handle(AppEvent::InputChanged { text: "hello".into() }, now);

        let actions = app.handle(AppEvent::MessageSubmitted, now);

        assert_eq!(actions[0], AppAction::SendTyping { is_typing: false });
        assert_eq!(app.draft(), "");
        assert!(!app.is_typing());
    }

    #[test]
    fn remote_typist_expires_on_tick() {
        let start = Instant::now();
        let mut app = open_app(start);
        let typing = TypingUpdate { user_id: Some("u2".into()), name: None, is_typing: true };

        let actions = app.handle(AppEvent::Realtime(InboundEvent::Typing(typing)), start);
        assert_eq!(actions, vec![AppAction::Render]);

        let actions = app.handle(AppEvent::Tick, start + Duration::from_secs(4));
        assert_eq!(actions, vec![AppAction::Render]);
        assert!(app.chat().typing().is_empty());
    }

    #[test]
    fn unknown_event_is_not_rendered() {
        let now = Instant::now();
        let mut app = open_app(now);

        let event = InboundEvent::Unknown { kind: "made_up_event".into() };
        assert!(app.handle(AppEvent::Realtime(event), now).is_empty());
        assert_eq!(app.chat().messages().len(), 1);
    }

    #[test]
    fn shutdown_quits() {
        let now = Instant::now();
        let mut app = open_app(now);

        assert_eq!(app.handle(AppEvent::Shutdown, now), vec![AppAction::Disconnect, AppAction::Quit]);
    }
}
