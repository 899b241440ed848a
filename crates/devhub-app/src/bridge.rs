//! Client-to-application translation layer.
//!
//! The [`HandlerBridge`] is the [`EventHandler`] a runtime installs on the
//! realtime client. It turns every callback into an [`AppEvent`] and pushes it
//! onto a channel, so client callbacks never touch view state directly and the
//! App sees realtime input in the same order as everything else.

use devhub_client::EventHandler;
use devhub_proto::{
    InboundEvent, MessageChange, MessageDeleted, ReactionUpdate, TypingUpdate,
    entities::{Message, Notification},
};
use tokio::sync::mpsc;

use crate::AppEvent;

/// Forwards client callbacks to an [`AppEvent`] channel.
#[derive(Debug, Clone)]
pub struct HandlerBridge {
    events: mpsc::UnboundedSender<AppEvent>,
}

impl HandlerBridge {
    /// Bridge writing into `events`.
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { events }
    }

    /// Bridge plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn forward(&self, event: AppEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("app event receiver dropped");
        }
    }

    fn realtime(&self, event: InboundEvent) {
        self.forward(AppEvent::Realtime(event));
    }
}

impl EventHandler for HandlerBridge {
    fn on_new_message(&mut self, message: Message) {
        self.realtime(InboundEvent::NewMessage(message));
    }

    fn on_message_updated(&mut self, change: MessageChange) {
        self.realtime(InboundEvent::MessageUpdated(change));
    }

    fn on_message_deleted(&mut self, deleted: MessageDeleted) {
        self.realtime(InboundEvent::MessageDeleted(deleted));
    }

    fn on_typing(&mut self, typing: TypingUpdate) {
        self.realtime(InboundEvent::Typing(typing));
    }

    fn on_reaction_updated(&mut self, update: ReactionUpdate) {
        self.realtime(InboundEvent::ReactionUpdated(update));
    }

    fn on_notification_created(&mut self, notification: Notification) {
        self.realtime(InboundEvent::NotificationCreated(notification));
    }

    fn on_connect(&mut self) {
        self.forward(AppEvent::Connected);
    }

    fn on_disconnect(&mut self) {
        self.forward(AppEvent::Disconnected);
    }

    fn on_error(&mut self, message: &str) {
        self.forward(AppEvent::Error { message: message.to_string() });
    }

    fn on_reconnect_exhausted(&mut self) {
        self.forward(AppEvent::ReconnectExhausted);
    }
}

#[cfg(test)]
mod tests {
    use devhub_client::dispatch;

    use super::*;

    #[test]
    fn callbacks_arrive_in_order() {
        let (mut bridge, mut rx) = HandlerBridge::channel();

        bridge.on_connect();
        dispatch(&mut bridge, InboundEvent::MessageDeleted(MessageDeleted { message_id: "1".into() }));
        dispatch(&mut bridge, InboundEvent::Pong);
        bridge.on_error("reset");
        bridge.on_disconnect();

        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }

        assert_eq!(received, vec![
            AppEvent::Connected,
            AppEvent::Realtime(InboundEvent::MessageDeleted(MessageDeleted {
                message_id: "1".into()
            })),
            AppEvent::Error { message: "reset".into() },
            AppEvent::Disconnected,
        ]);
    }

    #[test]
    fn dropped_receiver_is_harmless() {
        let (mut bridge, rx) = HandlerBridge::channel();
        drop(rx);

        bridge.on_connect();
    }
}
