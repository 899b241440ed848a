//! Realtime event callbacks.

use devhub_proto::{
    InboundEvent, MessageChange, MessageDeleted, ReactionUpdate, TypingUpdate,
    entities::{Message, Notification},
};

/// Callbacks for one realtime subscription.
///
/// Every method defaults to a no-op, so implementors only override what their
/// view consumes. Callbacks run on the task that drives the client and must
/// not block.
pub trait EventHandler: Send {
    /// `new_message`
    fn on_new_message(&mut self, _message: Message) {}

    /// `message_updated`
    fn on_message_updated(&mut self, _change: MessageChange) {}

    /// `message_deleted`
    fn on_message_deleted(&mut self, _deleted: MessageDeleted) {}

    /// `typing`
    fn on_typing(&mut self, _typing: TypingUpdate) {}

    /// `reaction_updated`
    fn on_reaction_updated(&mut self, _update: ReactionUpdate) {}

    /// `notification_created`
    fn on_notification_created(&mut self, _notification: Notification) {}

    /// Socket opened.
    fn on_connect(&mut self) {}

    /// Socket closed, whatever the reason.
    fn on_disconnect(&mut self) {}

    /// Socket error.
    fn on_error(&mut self, _message: &str) {}

    /// Automatic reconnects gave up.
    fn on_reconnect_exhausted(&mut self) {}
}

/// Handler that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl EventHandler for NoopHandler {}

/// Route a decoded event to the matching callback.
///
/// `pong` and unknown tags have no callback.
pub fn dispatch(handler: &mut dyn EventHandler, event: InboundEvent) {
    match event {
        InboundEvent::NewMessage(message) => handler.on_new_message(message),
        InboundEvent::MessageUpdated(change) => handler.on_message_updated(change),
        InboundEvent::MessageDeleted(deleted) => handler.on_message_deleted(deleted),
        InboundEvent::Typing(typing) => handler.on_typing(typing),
        InboundEvent::ReactionUpdated(update) => handler.on_reaction_updated(update),
        InboundEvent::NotificationCreated(notification) => {
            handler.on_notification_created(notification);
        },
        InboundEvent::Pong | InboundEvent::Unknown { .. } => {},
    }
}
