//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the [`crate::App`]
//! state machine.
//!
//! Events originate from three sources:
//! - Page lifecycle and user input (topic selection, typing, submit).
//! - Realtime notifications forwarded by [`crate::HandlerBridge`].
//! - Periodic ticks from the driver.

use devhub_proto::{
    InboundEvent,
    entities::{Message, Notification},
};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A chat topic was opened, with its first REST page (newest first).
    TopicSelected {
        /// Topic id.
        topic_id: String,
        /// Initial messages as the REST endpoint returns them.
        page: Vec<Message>,
    },

    /// The open topic was closed.
    TopicClosed,

    /// The notification list was fetched.
    NotificationsLoaded(Vec<Notification>),

    /// Realtime event from the topic socket.
    Realtime(InboundEvent),

    /// Socket opened.
    Connected,

    /// Socket closed.
    Disconnected,

    /// Transport error.
    Error {
        /// Error description.
        message: String,
    },

    /// Automatic reconnects gave up.
    ReconnectExhausted,

    /// The message draft changed.
    InputChanged {
        /// Current draft.
        text: String,
    },

    /// The draft was submitted.
    MessageSubmitted,

    /// Periodic tick.
    Tick,

    /// The user asked to leave.
    Shutdown,
}
