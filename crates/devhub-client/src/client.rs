//! Realtime client state machine.

use std::{ops::Sub, time::Duration};

use devhub_core::{ApiBase, Connection, ConnectionAction, ConnectionConfig, ConnectionState};
use devhub_proto::OutboundEvent;

use crate::{
    error::ClientError,
    event::{TransportAction, TransportEvent},
    handler::{EventHandler, dispatch},
};

/// Realtime client for one topic at a time.
///
/// Sans-IO: the caller feeds [`TransportEvent`]s and executes the returned
/// [`TransportAction`]s. Handler callbacks run synchronously inside these
/// calls.
pub struct RealtimeClient<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    connection: Connection<I>,
    handler: Option<Box<dyn EventHandler>>,
}

impl<I> RealtimeClient<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Client for the realtime endpoint under `api`.
    pub fn new(api: ApiBase, config: ConnectionConfig) -> Self {
        Self { connection: Connection::new(api, config), handler: None }
    }

    /// Subscribe to `resource_id`, replacing any existing subscription.
    ///
    /// The previous handler is dropped without further callbacks. `handler`
    /// stays installed across automatic reconnects.
    pub fn connect(
        &mut self,
        resource_id: &str,
        token: &str,
        handler: Box<dyn EventHandler>,
    ) -> Vec<TransportAction> {
        self.handler = Some(handler);
        let actions = self.connection.connect(resource_id, token);
        self.execute(actions)
    }

    /// Encode and write `event`.
    ///
    /// Fails with [`ClientError::NotConnected`] unless the socket is open.
    pub fn send(&mut self, event: &OutboundEvent) -> Result<Vec<TransportAction>, ClientError> {
        let actions = self.connection.send(event)?;
        Ok(self.execute(actions))
    }

    /// Send a typing indicator.
    pub fn send_typing(&mut self, is_typing: bool) -> Result<Vec<TransportAction>, ClientError> {
        self.send(&OutboundEvent::Typing { is_typing })
    }

    /// Close the socket, cancel any reconnect and drop the handler.
    ///
    /// The handler still sees `on_disconnect` if a socket was live.
    /// Idempotent.
    pub fn disconnect(&mut self) -> Vec<TransportAction> {
        let actions = self.connection.disconnect();
        let transport = self.execute(actions);
        self.handler = None;
        transport
    }

    /// Whether the socket is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Subscribed topic.
    pub fn resource_id(&self) -> Option<&str> {
        self.connection.resource_id()
    }

    /// Underlying state machine, for inspection.
    pub fn connection(&self) -> &Connection<I> {
        &self.connection
    }

    /// Process a driver report.
    pub fn handle(&mut self, event: TransportEvent, now: I) -> Vec<TransportAction> {
        let actions = match event {
            TransportEvent::Opened { socket } => self.connection.handle_open(socket, now),
            TransportEvent::Text { socket, text } => self.connection.handle_text(socket, &text),
            TransportEvent::Error { socket, message } => self.connection.handle_error(socket, &message),
            TransportEvent::Closed { socket } => self.connection.handle_close(socket),
            TransportEvent::ReconnectDue { generation } => self.connection.reconnect_due(generation),
            TransportEvent::Tick => self.connection.tick(now),
        };
        self.execute(actions)
    }

    /// Run notifications through the handler; pass transport work through.
    fn execute(&mut self, actions: Vec<ConnectionAction>) -> Vec<TransportAction> {
        let mut transport = Vec::new();

        for action in actions {
            match action {
                ConnectionAction::OpenSocket { socket, url } => {
                    transport.push(TransportAction::Open { socket, url });
                },
                ConnectionAction::CloseSocket { socket } => {
                    transport.push(TransportAction::Close { socket });
                },
                ConnectionAction::SendText { socket, text } => {
                    transport.push(TransportAction::Send { socket, text });
                },
                ConnectionAction::ScheduleReconnect { generation, delay, .. } => {
                    transport.push(TransportAction::Schedule { generation, delay });
                },
                ConnectionAction::Deliver(event) => {
                    if let Some(handler) = self.handler.as_deref_mut() {
                        dispatch(handler, event);
                    }
                },
                ConnectionAction::Connected => self.notify(|h| h.on_connect()),
                ConnectionAction::Disconnected => self.notify(|h| h.on_disconnect()),
                ConnectionAction::Error { message } => self.notify(|h| h.on_error(&message)),
                ConnectionAction::ReconnectExhausted => self.notify(|h| h.on_reconnect_exhausted()),
            }
        }

        transport
    }

    fn notify(&mut self, f: impl FnOnce(&mut dyn EventHandler)) {
        if let Some(handler) = self.handler.as_deref_mut() {
            f(handler);
        }
    }
}
