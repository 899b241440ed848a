//! WebSocket transport for the client.
//!
//! [`WebSocketClient`] runs a [`RealtimeClient`] inside a tokio task and
//! executes its actions: each socket is a child task speaking
//! `tokio-tungstenite`, each reconnect is a sleeping child task. Children
//! report back over one channel, tagged with their socket id or generation, so
//! the state machine can discard reports from sockets and timers it already
//! abandoned.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use devhub_core::{ApiBase, ConnectionConfig, SocketId, env::Environment};
use devhub_proto::OutboundEvent;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::{
    client::RealtimeClient,
    error::ClientError,
    event::{TransportAction, TransportEvent},
    handler::EventHandler,
};

/// How often the actor ticks the state machine for heartbeats.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// WebSocket handshake failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Read or write failed on an open socket.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Production environment: wall-clock time and tokio sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

enum Command {
    Connect { resource_id: String, token: String, handler: Box<dyn EventHandler> },
    Send { event: OutboundEvent, reply: oneshot::Sender<Result<(), ClientError>> },
    Disconnect,
}

/// Handle to the realtime client task.
///
/// Cheap to clone; all clones drive the same connection. The task stops when
/// every handle is dropped.
#[derive(Clone)]
pub struct WebSocketClient {
    commands: mpsc::UnboundedSender<Command>,
    connected: Arc<AtomicBool>,
}

impl WebSocketClient {
    /// Spawn the client task on the current tokio runtime.
    pub fn spawn(api: ApiBase, config: ConnectionConfig) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        let actor = Actor::new(RealtimeClient::new(api, config), SystemEnv, connected.clone());
        tokio::spawn(actor.run(commands_rx));

        Self { commands: commands_tx, connected }
    }

    /// Subscribe to `resource_id`, replacing any existing subscription.
    pub fn connect(&self, resource_id: &str, token: &str, handler: impl EventHandler + 'static) {
        let command = Command::Connect {
            resource_id: resource_id.to_string(),
            token: token.to_string(),
            handler: Box::new(handler),
        };
        if self.commands.send(command).is_err() {
            tracing::error!("client task is gone, connect dropped");
        }
    }

    /// Write `event` to the open socket.
    pub async fn send(&self, event: OutboundEvent) -> Result<(), ClientError> {
        let (reply, response) = oneshot::channel();
        self.commands.send(Command::Send { event, reply }).map_err(|_| ClientError::Closed)?;
        response.await.map_err(|_| ClientError::Closed)?
    }

    /// Send a typing indicator.
    pub async fn send_typing(&self, is_typing: bool) -> Result<(), ClientError> {
        self.send(OutboundEvent::Typing { is_typing }).await
    }

    /// Close the socket and cancel reconnects. Idempotent.
    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }

    /// Whether the socket is open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

struct Actor<E: Environment> {
    client: RealtimeClient<E::Instant>,
    env: E,
    connected: Arc<AtomicBool>,
    sockets: HashMap<SocketId, mpsc::UnboundedSender<String>>,
    timers: Vec<JoinHandle<()>>,
    reports_tx: mpsc::UnboundedSender<TransportEvent>,
    reports_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl<E: Environment> Actor<E> {
    fn new(client: RealtimeClient<E::Instant>, env: E, connected: Arc<AtomicBool>) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self { client, env, connected, sockets: HashMap::new(), timers: Vec::new(), reports_tx, reports_rx }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            let actions = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(report) = self.reports_rx.recv() => self.handle_report(report),
                _ = ticker.tick() => {
                    let now = self.env.now();
                    self.client.handle(TransportEvent::Tick, now)
                },
            };

            self.execute(actions);
            self.connected.store(self.client.is_connected(), Ordering::Release);
        }

        let actions = self.client.disconnect();
        self.execute(actions);
        self.connected.store(false, Ordering::Release);
        tracing::debug!("client task stopped");
    }

    fn handle_report(&mut self, report: TransportEvent) -> Vec<TransportAction> {
        // A socket that closed on its own never gets a Close action.
        if let TransportEvent::Closed { socket } = &report {
            self.sockets.remove(socket);
        }
        let now = self.env.now();
        self.client.handle(report, now)
    }

    fn handle_command(&mut self, command: Command) -> Vec<TransportAction> {
        match command {
            Command::Connect { resource_id, token, handler } => {
                self.cancel_timers();
                self.client.connect(&resource_id, &token, handler)
            },
            Command::Send { event, reply } => match self.client.send(&event) {
                Ok(actions) => {
                    let _ = reply.send(Ok(()));
                    actions
                },
                Err(err) => {
                    let _ = reply.send(Err(err));
                    Vec::new()
                },
            },
            Command::Disconnect => {
                self.cancel_timers();
                self.client.disconnect()
            },
        }
    }

    fn cancel_timers(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }

    fn execute(&mut self, actions: Vec<TransportAction>) {
        for action in actions {
            match action {
                TransportAction::Open { socket, url } => {
                    let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
                    self.sockets.insert(socket, outgoing_tx);
                    tokio::spawn(run_socket(socket, url, outgoing_rx, self.reports_tx.clone()));
                },
                TransportAction::Close { socket } => {
                    // Dropping the sender makes the socket task close and exit.
                    self.sockets.remove(&socket);
                },
                TransportAction::Send { socket, text } => {
                    let delivered = self.sockets.get(&socket).is_some_and(|tx| tx.send(text).is_ok());
                    if !delivered {
                        tracing::warn!(%socket, "dropping frame for closed socket");
                    }
                },
                TransportAction::Schedule { generation, delay } => {
                    self.timers.retain(|t| !t.is_finished());
                    let reports = self.reports_tx.clone();
                    let env = self.env.clone();
                    self.timers.push(tokio::spawn(async move {
                        env.sleep(delay).await;
                        let _ = reports.send(TransportEvent::ReconnectDue { generation });
                    }));
                },
            }
        }
    }
}

/// Drive one socket until it closes or its outgoing channel is dropped.
async fn run_socket(
    socket: SocketId,
    url: String,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    reports: mpsc::UnboundedSender<TransportEvent>,
) {
    if let Err(err) = pump_socket(socket, &url, &mut outgoing, &reports).await {
        let _ = reports.send(TransportEvent::Error { socket, message: err.to_string() });
    }
    let _ = reports.send(TransportEvent::Closed { socket });
}

async fn pump_socket(
    socket: SocketId,
    url: &str,
    outgoing: &mut mpsc::UnboundedReceiver<String>,
    reports: &mpsc::UnboundedSender<TransportEvent>,
) -> Result<(), TransportError> {
    let (stream, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;
    let (mut writer, mut reader) = stream.split();

    let _ = reports.send(TransportEvent::Opened { socket });

    loop {
        tokio::select! {
            text = outgoing.recv() => match text {
                Some(text) => writer
                    .send(WsMessage::Text(text.into()))
                    .await
                    .map_err(|e| TransportError::Stream(e.to_string()))?,
                None => {
                    let _ = writer.close().await;
                    return Ok(());
                },
            },
            frame = reader.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let _ = reports.send(TransportEvent::Text { socket, text: text.as_str().to_string() });
                },
                Some(Ok(WsMessage::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {},
                Some(Err(e)) => return Err(TransportError::Stream(e.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use devhub_core::ReconnectConfig;
    use tokio::{net::TcpListener, time::timeout};

    use super::*;
    use crate::handler::NoopHandler;

    #[tokio::test]
    async fn refused_sockets_leave_no_senders_behind() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiBase::parse(&format!("http://{addr}/api")).unwrap();
        let config = ConnectionConfig {
            reconnect: ReconnectConfig { base_delay: Duration::from_millis(1), max_attempts: 5 },
            heartbeat_interval: None,
        };
        let mut actor =
            Actor::new(RealtimeClient::new(api, config), SystemEnv, Arc::new(AtomicBool::new(false)));

        let actions = actor.client.connect("t1", "tok", Box::new(NoopHandler));
        actor.execute(actions);

        let mut closes = 0;
        while let Ok(Some(report)) = timeout(Duration::from_secs(2), actor.reports_rx.recv()).await {
            if matches!(report, TransportEvent::Closed { .. }) {
                closes += 1;
            }
            let actions = actor.handle_report(report);
            actor.execute(actions);
            assert!(actor.sockets.len() <= 1);
        }

        assert_eq!(closes, 6);
        assert_eq!(actor.client.connection().socket(), None);
        assert!(actor.sockets.is_empty());
    }
}
