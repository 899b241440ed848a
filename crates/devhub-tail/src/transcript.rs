//! Change detection between renders.
//!
//! The tail has no screen; instead each render is compared with the previous
//! one and every difference becomes a [`Change`] that the driver logs.

use std::{collections::HashMap, ops::Sub, time::Duration};

use devhub_app::{App, ConnectionStatus};

/// One observable difference between two renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Realtime status changed.
    Status(ConnectionStatus),
    /// A message appeared.
    Added {
        /// Message id.
        id: String,
        /// Author name or id, when known.
        author: Option<String>,
        /// Body.
        content: String,
    },
    /// A message body changed.
    Edited {
        /// Message id.
        id: String,
        /// New body.
        content: String,
    },
    /// A message disappeared.
    Deleted {
        /// Message id.
        id: String,
    },
    /// The set of typists changed.
    Typing(Vec<String>),
    /// Unread notification count changed.
    Unread(usize),
    /// A new status message.
    Notice(String),
}

/// What the previous render showed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    status: Option<ConnectionStatus>,
    contents: HashMap<String, String>,
    typing: Vec<String>,
    unread: usize,
    notice: Option<String>,
}

impl Transcript {
    /// Transcript that has seen nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `app` with the previous render and remember it.
    ///
    /// Messages are reported in display order; deletions come last.
    pub fn diff<I>(&mut self, app: &App<I>) -> Vec<Change>
    where
        I: Copy + Ord + Sub<Output = Duration>,
    {
        let mut changes = Vec::new();

        if self.status != Some(app.status()) {
            self.status = Some(app.status());
            changes.push(Change::Status(app.status()));
        }

        let messages = app.chat().messages();
        let mut contents = HashMap::with_capacity(messages.len());
        for message in messages.iter() {
            match self.contents.remove(&message.id) {
                None => changes.push(Change::Added {
                    id: message.id.clone(),
                    author: message
                        .user
                        .as_ref()
                        .map(|u| u.name.clone())
                        .or_else(|| message.user_id.clone()),
                    content: message.content.clone(),
                }),
                Some(previous) if previous != message.content => changes.push(Change::Edited {
                    id: message.id.clone(),
                    content: message.content.clone(),
                }),
                Some(_) => {},
            }
            contents.insert(message.id.clone(), message.content.clone());
        }

        let mut deleted: Vec<_> = std::mem::replace(&mut self.contents, contents).into_keys().collect();
        deleted.sort();
        changes.extend(deleted.into_iter().map(|id| Change::Deleted { id }));

        let typing: Vec<_> = app.chat().typing().iter().map(|t| t.label().to_string()).collect();
        if typing != self.typing {
            self.typing.clone_from(&typing);
            changes.push(Change::Typing(typing));
        }

        let unread = app.notifications().unread_count();
        if unread != self.unread {
            self.unread = unread;
            changes.push(Change::Unread(unread));
        }

        let notice = app.status_message().map(str::to_string);
        if notice != self.notice {
            if let Some(text) = &notice {
                changes.push(Change::Notice(text.clone()));
            }
            self.notice = notice;
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use devhub_app::AppEvent;
    use devhub_proto::{InboundEvent, MessageChange, MessageDeleted, entities::{Message, MessagePatch}};

    use super::*;

    #[test]
    fn reports_lifecycle_of_a_message() {
        let now = Instant::now();
        let mut app = App::new();
        let mut transcript = Transcript::new();

        assert_eq!(transcript.diff(&app), vec![Change::Status(ConnectionStatus::Offline)]);

        app.handle(
            AppEvent::TopicSelected { topic_id: "t1".into(), page: vec![Message::text("1", "t1", "hi")] },
            now,
        );
        assert_eq!(transcript.diff(&app), vec![
            Change::Status(ConnectionStatus::Connecting),
            Change::Added { id: "1".into(), author: None, content: "hi".into() },
        ]);

        let change = MessageChange { id: "1".into(), patch: MessagePatch::content("edited") };
        app.handle(AppEvent::Realtime(InboundEvent::MessageUpdated(change)), now);
        assert_eq!(transcript.diff(&app), vec![Change::Edited {
            id: "1".into(),
            content: "edited".into()
        }]);

        let deleted = MessageDeleted { message_id: "1".into() };
        app.handle(AppEvent::Realtime(InboundEvent::MessageDeleted(deleted)), now);
        assert_eq!(transcript.diff(&app), vec![Change::Deleted { id: "1".into() }]);

        assert!(transcript.diff(&app).is_empty());
    }

    #[test]
    fn notices_are_reported_once() {
        let now = Instant::now();
        let mut app = App::new();
        let mut transcript = Transcript::new();
        transcript.diff(&app);

        app.handle(AppEvent::Error { message: "reset".into() }, now);

        assert_eq!(transcript.diff(&app), vec![Change::Notice("Error: reset".into())]);
        assert!(transcript.diff(&app).is_empty());
    }
}
