//! Realtime connection state machine.
//!
//! Owns the lifecycle of the single WebSocket behind a topic subscription:
//! opening and replacing sockets, decoding inbound frames, heartbeats and the
//! exponential-backoff reconnect loop.
//!
//! Sockets are identified by a [`SocketId`] handed out when the machine asks
//! the driver to open one. Callbacks carrying any other id belong to a socket
//! that was already replaced or torn down and are ignored, which is how a
//! replaced socket's handlers are detached. Reconnect timers carry a
//! generation number; `connect` and `disconnect` bump it, so a timer that fires
//! after either is ignored.

use std::{fmt, ops::Sub, time::Duration};

use devhub_proto::{InboundEvent, OutboundEvent, decode_frame};

use crate::{config::ConnectionConfig, endpoint::ApiBase, error::ConnectionError};

/// Identity of one underlying socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(pub u64);

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket-{}", self.0)
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No target; never connected or explicitly disconnected.
    Idle,
    /// Socket requested, waiting for the driver to report it open.
    Connecting,
    /// Socket open, events flowing.
    Open,
    /// Socket closed unexpectedly; a reconnect may be pending.
    Closed,
}

/// Actions returned by the connection state machine.
///
/// The driver executes the socket and timer actions; the notification actions
/// (`Deliver`, `Connected`, ...) are for the layer that owns the handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Open a WebSocket to `url` and report its lifecycle under `socket`.
    OpenSocket {
        /// Id to tag every callback from this socket with.
        socket: SocketId,
        /// Endpoint URL.
        url: String,
    },

    /// Close this socket. No further callbacks from it are expected.
    CloseSocket {
        /// Socket to close.
        socket: SocketId,
    },

    /// Write a text frame.
    SendText {
        /// Target socket.
        socket: SocketId,
        /// JSON envelope.
        text: String,
    },

    /// Call [`Connection::reconnect_due`] with `generation` after `delay`.
    ScheduleReconnect {
        /// Generation the timer belongs to.
        generation: u64,
        /// 1-based attempt number.
        attempt: u32,
        /// Backoff delay.
        delay: Duration,
    },

    /// Decoded event for the handlers.
    Deliver(InboundEvent),

    /// Socket opened.
    Connected,

    /// Socket closed (unexpectedly or by `disconnect`).
    Disconnected,

    /// Socket reported an error.
    Error {
        /// Error description.
        message: String,
    },

    /// Reconnect attempts are used up. Only an external `connect` restarts.
    ReconnectExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    resource_id: String,
    token: String,
}

/// Connection state machine
///
/// Pure state machine: no I/O, no timers. Time is passed to the methods that
/// need it.
#[derive(Debug, Clone)]
pub struct Connection<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    state: ConnectionState,
    config: ConnectionConfig,
    api: ApiBase,
    target: Option<Target>,
    socket: Option<SocketId>,
    next_socket: u64,
    attempts: u32,
    generation: u64,
    last_heartbeat: Option<I>,
}

impl<I> Connection<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a new connection in [`ConnectionState::Idle`].
    pub fn new(api: ApiBase, config: ConnectionConfig) -> Self {
        Self {
            state: ConnectionState::Idle,
            config,
            api,
            target: None,
            socket: None,
            next_socket: 1,
            attempts: 0,
            generation: 0,
            last_heartbeat: None,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the live socket is open.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// The live socket, if any.
    pub fn socket(&self) -> Option<SocketId> {
        self.socket
    }

    /// Resource the connection is subscribed to.
    pub fn resource_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.resource_id.as_str())
    }

    /// Reconnect attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Current reconnect generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Configuration in use.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Subscribe to `resource_id`, replacing any existing socket.
    ///
    /// The previous socket is closed without a `Disconnected` notification.
    /// Pending reconnects are cancelled and the attempt counter is reset.
    pub fn connect(&mut self, resource_id: &str, token: &str) -> Vec<ConnectionAction> {
        let mut actions = Vec::new();

        if let Some(old) = self.socket.take() {
            tracing::debug!(%old, "replacing socket");
            actions.push(ConnectionAction::CloseSocket { socket: old });
        }

        self.generation += 1;
        self.attempts = 0;
        self.target = Some(Target { resource_id: resource_id.to_string(), token: token.to_string() });

        actions.extend(self.open_socket());
        actions
    }

    fn open_socket(&mut self) -> Option<ConnectionAction> {
        let target = self.target.as_ref()?;
        let url = self.api.topic_socket_url(&target.resource_id, &target.token);
        let socket = SocketId(self.next_socket);
        tracing::info!(%socket, resource_id = %target.resource_id, attempt = self.attempts, "connecting");

        self.next_socket += 1;
        self.socket = Some(socket);
        self.state = ConnectionState::Connecting;
        self.last_heartbeat = None;

        Some(ConnectionAction::OpenSocket { socket, url })
    }

    fn is_live(&self, socket: SocketId) -> bool {
        if self.socket == Some(socket) {
            return true;
        }
        tracing::trace!(%socket, live = ?self.socket, "ignoring callback from stale socket");
        false
    }

    /// Driver reports the socket open.
    pub fn handle_open(&mut self, socket: SocketId, now: I) -> Vec<ConnectionAction> {
        if !self.is_live(socket) {
            return Vec::new();
        }

        tracing::info!(%socket, "websocket connected");
        self.state = ConnectionState::Open;
        self.attempts = 0;
        self.last_heartbeat = Some(now);

        vec![ConnectionAction::Connected]
    }

    /// Driver delivers a text frame.
    ///
    /// Each line of the frame is decoded separately. `pong` is swallowed;
    /// unknown tags and undecodable lines are logged and dropped.
    pub fn handle_text(&mut self, socket: SocketId, text: &str) -> Vec<ConnectionAction> {
        if !self.is_live(socket) {
            return Vec::new();
        }

        let mut actions = Vec::new();
        for decoded in decode_frame(text) {
            match decoded {
                Ok(InboundEvent::Pong) => tracing::trace!(%socket, "pong"),
                Ok(InboundEvent::Unknown { kind }) => {
                    tracing::info!(%socket, %kind, "unknown websocket message type");
                },
                Ok(event) => actions.push(ConnectionAction::Deliver(event)),
                Err(error) => {
                    tracing::warn!(%socket, %error, "failed to parse websocket message");
                },
            }
        }
        actions
    }

    /// Driver reports a socket error. A close is expected to follow.
    pub fn handle_error(&mut self, socket: SocketId, message: &str) -> Vec<ConnectionAction> {
        if !self.is_live(socket) {
            return Vec::new();
        }

        tracing::warn!(%socket, %message, "websocket error");
        vec![ConnectionAction::Error { message: message.to_string() }]
    }

    /// Driver reports the socket closed (including failed opens).
    pub fn handle_close(&mut self, socket: SocketId) -> Vec<ConnectionAction> {
        if !self.is_live(socket) {
            return Vec::new();
        }

        tracing::info!(%socket, "websocket disconnected");
        self.socket = None;
        self.state = ConnectionState::Closed;
        self.last_heartbeat = None;

        let mut actions = vec![ConnectionAction::Disconnected];
        if self.target.is_none() {
            return actions;
        }

        let max = self.config.reconnect.max_attempts;
        if self.attempts >= max {
            tracing::error!(attempts = self.attempts, "max reconnection attempts reached");
            actions.push(ConnectionAction::ReconnectExhausted);
            return actions;
        }

        self.attempts += 1;
        let delay = self.config.reconnect.delay_for(self.attempts);
        tracing::info!(attempt = self.attempts, max, ?delay, "scheduling reconnect");

        actions.push(ConnectionAction::ScheduleReconnect {
            generation: self.generation,
            attempt: self.attempts,
            delay,
        });
        actions
    }

    /// A reconnect timer fired.
    ///
    /// Ignored when the timer's generation is stale, the target was cleared or
    /// a socket is already live.
    pub fn reconnect_due(&mut self, generation: u64) -> Vec<ConnectionAction> {
        if generation != self.generation || self.target.is_none() || self.socket.is_some() {
            tracing::debug!(generation, current = self.generation, "ignoring stale reconnect");
            return Vec::new();
        }

        self.open_socket().into_iter().collect()
    }

    /// Encode `event` for the live socket.
    ///
    /// Never queues: fails with [`ConnectionError::NotConnected`] unless the
    /// socket is open.
    pub fn send(&mut self, event: &OutboundEvent) -> Result<Vec<ConnectionAction>, ConnectionError> {
        let Some(socket) = self.socket.filter(|_| self.state == ConnectionState::Open) else {
            tracing::error!(kind = event.kind(), "websocket is not connected");
            return Err(ConnectionError::NotConnected);
        };

        let text = event.encode()?;
        Ok(vec![ConnectionAction::SendText { socket, text }])
    }

    /// Close the socket and forget the target. Idempotent.
    pub fn disconnect(&mut self) -> Vec<ConnectionAction> {
        let mut actions = Vec::new();

        if let Some(socket) = self.socket.take() {
            tracing::info!(%socket, "disconnecting");
            actions.push(ConnectionAction::CloseSocket { socket });
            actions.push(ConnectionAction::Disconnected);
        }

        self.target = None;
        self.generation += 1;
        self.attempts = 0;
        self.state = ConnectionState::Idle;
        self.last_heartbeat = None;

        actions
    }

    /// Periodic maintenance: sends `ping` once the heartbeat interval elapsed.
    pub fn tick(&mut self, now: I) -> Vec<ConnectionAction> {
        let (Some(interval), Some(socket)) = (self.config.heartbeat_interval, self.socket) else {
            return Vec::new();
        };
        if self.state != ConnectionState::Open {
            return Vec::new();
        }

        let due = match self.last_heartbeat {
            None => true,
            Some(last) => now - last >= interval,
        };
        if !due {
            return Vec::new();
        }

        self.last_heartbeat = Some(now);
        match OutboundEvent::Ping.encode() {
            Ok(text) => vec![ConnectionAction::SendText { socket, text }],
            Err(error) => {
                tracing::error!(%error, "failed to encode heartbeat");
                Vec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::config::ReconnectConfig;

    fn conn() -> Connection<Instant> {
        let api = ApiBase::parse("https://dvhub.tech/api").unwrap();
        Connection::new(api, ConnectionConfig::default())
    }

    fn opened_socket(actions: &[ConnectionAction]) -> SocketId {
        actions
            .iter()
            .find_map(|a| match a {
                ConnectionAction::OpenSocket { socket, .. } => Some(*socket),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn connect_opens_socket_to_topic_endpoint() {
        let mut conn = conn();
        let actions = conn.connect("t1", "tok");

        assert_eq!(actions, vec![ConnectionAction::OpenSocket {
            socket: SocketId(1),
            url: "wss://dvhub.tech/api/topics/t1/ws?token=tok".to_string(),
        }]);
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert_eq!(conn.resource_id(), Some("t1"));
    }

    #[test]
    fn lifecycle_open_then_close_schedules_reconnect() {
        let mut conn = conn();
        let t0 = Instant::now();
        let socket = opened_socket(&conn.connect("t1", "tok"));

        assert_eq!(conn.handle_open(socket, t0), vec![ConnectionAction::Connected]);
        assert!(conn.is_connected());

        let actions = conn.handle_close(socket);
        assert_eq!(actions, vec![
            ConnectionAction::Disconnected,
            ConnectionAction::ScheduleReconnect {
                generation: conn.generation(),
                attempt: 1,
                delay: Duration::from_millis(1000),
            },
        ]);
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn stale_socket_callbacks_are_ignored() {
        let mut conn = conn();
        let t0 = Instant::now();
        let first = opened_socket(&conn.connect("t1", "tok"));
        let second = opened_socket(&conn.connect("t2", "tok"));

        assert!(conn.handle_open(first, t0).is_empty());
        assert!(conn.handle_close(first).is_empty());
        assert!(conn.handle_text(first, r#"{"type":"message_deleted","payload":{"message_id":"1"}}"#).is_empty());
        assert_eq!(conn.socket(), Some(second));
    }

    #[test]
    fn reconnect_attempt_reuses_generation_and_open_resets_attempts() {
        let mut conn = conn();
        let t0 = Instant::now();
        let socket = opened_socket(&conn.connect("t1", "tok"));
        conn.handle_close(socket);
        assert_eq!(conn.attempts(), 1);

        let retry = opened_socket(&conn.reconnect_due(conn.generation()));
        conn.handle_open(retry, t0);
        assert_eq!(conn.attempts(), 0);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let mut conn = conn();
        let mut socket = opened_socket(&conn.connect("t1", "tok"));

        for attempt in 1..=5 {
            let actions = conn.handle_close(socket);
            assert!(matches!(
                actions.last(),
                Some(ConnectionAction::ScheduleReconnect { attempt: a, .. }) if *a == attempt
            ));
            socket = opened_socket(&conn.reconnect_due(conn.generation()));
        }

        let actions = conn.handle_close(socket);
        assert_eq!(actions, vec![ConnectionAction::Disconnected, ConnectionAction::ReconnectExhausted]);
    }

    #[test]
    fn disconnect_cancels_pending_reconnect() {
        let mut conn = conn();
        let socket = opened_socket(&conn.connect("t1", "tok"));
        conn.handle_close(socket);
        let pending = conn.generation();

        assert!(conn.disconnect().is_empty());
        assert!(conn.reconnect_due(pending).is_empty());
        assert_eq!(conn.state(), ConnectionState::Idle);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut conn = conn();
        let t0 = Instant::now();
        let socket = opened_socket(&conn.connect("t1", "tok"));
        conn.handle_open(socket, t0);

        assert_eq!(conn.disconnect(), vec![
            ConnectionAction::CloseSocket { socket },
            ConnectionAction::Disconnected
        ]);
        assert!(conn.disconnect().is_empty());
        // Close report for the socket we tore down.
        assert!(conn.handle_close(socket).is_empty());
    }

    #[test]
    fn send_requires_open_socket() {
        let mut conn = conn();
        let t0 = Instant::now();

        assert_eq!(conn.send(&OutboundEvent::Typing { is_typing: true }), Err(ConnectionError::NotConnected));

        let socket = opened_socket(&conn.connect("t1", "tok"));
        assert_eq!(conn.send(&OutboundEvent::Ping), Err(ConnectionError::NotConnected));

        conn.handle_open(socket, t0);
        let actions = conn.send(&OutboundEvent::Typing { is_typing: false }).unwrap();
        assert_eq!(actions, vec![ConnectionAction::SendText {
            socket,
            text: r#"{"type":"typing","payload":{"is_typing":false}}"#.to_string(),
        }]);
    }

    #[test]
    fn text_frames_are_decoded_and_filtered() {
        let mut conn = conn();
        let t0 = Instant::now();
        let socket = opened_socket(&conn.connect("t1", "tok"));
        conn.handle_open(socket, t0);

        let frame = concat!(
            r#"{"type":"pong"}"#,
            "\n",
            r#"{"type":"made_up_event","payload":{}}"#,
            "\n",
            "not json\n",
            r#"{"type":"message_deleted","payload":{"message_id":"9"}}"#,
        );
        let actions = conn.handle_text(socket, frame);

        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], ConnectionAction::Deliver(InboundEvent::MessageDeleted(d)) if d.message_id == "9"));
    }

    #[test]
    fn heartbeat_follows_interval() {
        let api = ApiBase::parse("http://h/api").unwrap();
        let config = ConnectionConfig {
            reconnect: ReconnectConfig::default(),
            heartbeat_interval: Some(Duration::from_secs(30)),
        };
        let mut conn = Connection::new(api, config);
        let t0 = Instant::now();
        let socket = opened_socket(&conn.connect("t1", "tok"));
        conn.handle_open(socket, t0);

        assert!(conn.tick(t0 + Duration::from_secs(29)).is_empty());
        let actions = conn.tick(t0 + Duration::from_secs(30));
        assert_eq!(actions, vec![ConnectionAction::SendText {
            socket,
            text: r#"{"type":"ping","payload":{}}"#.to_string(),
        }]);
        assert!(conn.tick(t0 + Duration::from_secs(31)).is_empty());
    }

    #[test]
    fn heartbeat_disabled() {
        let api = ApiBase::parse("http://h/api").unwrap();
        let config = ConnectionConfig { reconnect: ReconnectConfig::default(), heartbeat_interval: None };
        let mut conn = Connection::new(api, config);
        let t0 = Instant::now();
        let socket = opened_socket(&conn.connect("t1", "tok"));
        conn.handle_open(socket, t0);

        assert!(conn.tick(t0 + Duration::from_secs(3600)).is_empty());
    }
}
