//! Log driver for the tail.
//!
//! Implements the [`Driver`] trait on top of the tokio WebSocket transport.
//! Realtime callbacks arrive through a [`HandlerBridge`]; a one-second ticker
//! drives typing expiry; Ctrl-C shuts the runtime down. Rendering logs what
//! changed since the previous render.

use std::{collections::VecDeque, io, path::Path, time::Instant};

use devhub_app::{App, AppEvent, Driver, HandlerBridge};
use devhub_client::{ApiBase, ClientError, ConnectionConfig, transport::WebSocketClient};
use devhub_core::{
    ConnectionError,
    session::AuthSession,
    storage::{RedbStorage, SafeStorage, StorageError},
};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{self, Duration, Interval, MissedTickBehavior},
};

use crate::transcript::{Change, Transcript};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Tail runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Realtime client rejected the operation.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// API base URL is unusable.
    #[error("endpoint error: {0}")]
    Endpoint(#[from] ConnectionError),

    /// State file could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Neither a token argument nor a stored login.
    #[error("no auth token: pass --token or sign in first")]
    MissingToken,

    /// I/O error, e.g. installing the signal handler.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Bearer token of the login stored in the state file at `path`.
///
/// Returns `None` if the file holds no complete login.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be opened as a database.
pub fn stored_token(path: &Path) -> Result<Option<String>, RuntimeError> {
    let storage = SafeStorage::new(RedbStorage::open(path)?);
    let mut session = AuthSession::new(storage);
    if !session.load_from_storage() {
        tracing::debug!(path = %path.display(), "no stored login");
        return Ok(None);
    }
    Ok(session.token().map(str::to_string))
}

/// Driver that subscribes to one topic and logs its changes.
pub struct TailDriver {
    client: WebSocketClient,
    token: String,
    bridge: HandlerBridge,
    events: mpsc::UnboundedReceiver<AppEvent>,
    ticker: Interval,
    pending: VecDeque<AppEvent>,
    transcript: Transcript,
}

impl TailDriver {
    /// Spawn the transport and queue the selection of `topic_id`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(api: ApiBase, config: ConnectionConfig, topic_id: &str, token: String) -> Self {
        let (bridge, events) = HandlerBridge::channel();
        let mut ticker = time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            client: WebSocketClient::spawn(api, config),
            token,
            bridge,
            events,
            ticker,
            pending: VecDeque::from([AppEvent::TopicSelected { topic_id: topic_id.to_string(), page: Vec::new() }]),
            transcript: Transcript::new(),
        }
    }

    /// Whether the socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}

impl Driver for TailDriver {
    type Error = RuntimeError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        tokio::select! {
            event = self.events.recv() => Ok(Some(event.unwrap_or(AppEvent::Shutdown))),
            _ = self.ticker.tick() => Ok(Some(AppEvent::Tick)),
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("interrupted, shutting down");
                Ok(Some(AppEvent::Shutdown))
            },
        }
    }

    async fn connect(&mut self, topic_id: &str) -> Result<(), Self::Error> {
        tracing::info!(topic_id, "subscribing");
        self.client.connect(topic_id, &self.token, self.bridge.clone());
        Ok(())
    }

    fn disconnect(&mut self) {
        self.client.disconnect();
    }

    async fn send_typing(&mut self, is_typing: bool) -> Result<(), Self::Error> {
        Ok(self.client.send_typing(is_typing).await?)
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App<Instant>) -> Result<(), Self::Error> {
        for change in self.transcript.diff(app) {
            log_change(&change);
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.client.disconnect();
    }
}

fn log_change(change: &Change) {
    match change {
        Change::Status(status) => tracing::info!(%status, "connection"),
        Change::Added { id, author, content } => {
            tracing::info!(%id, author = author.as_deref().unwrap_or("unknown"), "{content}");
        },
        Change::Edited { id, content } => tracing::info!(%id, "edited: {content}"),
        Change::Deleted { id } => tracing::info!(%id, "deleted"),
        Change::Typing(names) if names.is_empty() => tracing::debug!("nobody typing"),
        Change::Typing(names) => tracing::info!("typing: {}", names.join(", ")),
        Change::Unread(count) => tracing::info!(count, "unread notifications"),
        Change::Notice(text) => tracing::warn!("{text}"),
    }
}
