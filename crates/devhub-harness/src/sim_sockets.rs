//! Scripted socket layer.
//!
//! [`SimSockets`] executes the client's [`TransportAction`]s against an
//! in-memory server and reports back the [`TransportEvent`]s a real transport
//! would. Every open, close, write and timer is recorded so tests can assert
//! on the exact socket history.

use std::{collections::BTreeSet, time::Duration};

use devhub_client::{SocketId, TransportAction, TransportEvent};

use crate::sim_env::SimInstant;

/// One socket the client asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketRecord {
    /// Socket id.
    pub socket: SocketId,
    /// Endpoint URL.
    pub url: String,
    /// When the open was requested.
    pub opened_at: SimInstant,
}

#[derive(Debug, Clone)]
struct Timer {
    due: SimInstant,
    generation: u64,
}

/// In-memory server side of the realtime sockets.
#[derive(Debug, Clone)]
pub struct SimSockets {
    server_up: bool,
    live: BTreeSet<SocketId>,
    opened: Vec<SocketRecord>,
    sent: Vec<(SocketId, String)>,
    timers: Vec<Timer>,
    scheduled: Vec<Duration>,
}

impl Default for SimSockets {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSockets {
    /// Sockets against a reachable server.
    pub fn new() -> Self {
        Self {
            server_up: true,
            live: BTreeSet::new(),
            opened: Vec::new(),
            sent: Vec::new(),
            timers: Vec::new(),
            scheduled: Vec::new(),
        }
    }

    /// Make the server reachable or not. Opens against a down server fail.
    pub fn set_server_up(&mut self, up: bool) {
        self.server_up = up;
    }

    /// Execute client actions. Returns the reports they cause immediately.
    pub fn execute(&mut self, actions: Vec<TransportAction>, now: SimInstant) -> Vec<TransportEvent> {
        let mut reports = Vec::new();

        for action in actions {
            match action {
                TransportAction::Open { socket, url } => {
                    self.opened.push(SocketRecord { socket, url, opened_at: now });
                    if self.server_up {
                        self.live.insert(socket);
                        reports.push(TransportEvent::Opened { socket });
                    } else {
                        reports.push(TransportEvent::Error {
                            socket,
                            message: "connection refused".to_string(),
                        });
                        reports.push(TransportEvent::Closed { socket });
                    }
                },
                TransportAction::Close { socket } => {
                    if self.live.remove(&socket) {
                        reports.push(TransportEvent::Closed { socket });
                    }
                },
                TransportAction::Send { socket, text } => {
                    if self.live.contains(&socket) {
                        self.sent.push((socket, text));
                    } else {
                        tracing::warn!(%socket, "write to closed socket dropped");
                    }
                },
                TransportAction::Schedule { generation, delay } => {
                    self.scheduled.push(delay);
                    self.timers.push(Timer { due: now + delay, generation });
                },
            }
        }

        reports
    }

    /// Server closes every live socket.
    pub fn drop_all(&mut self) -> Vec<TransportEvent> {
        let dropped = std::mem::take(&mut self.live);
        dropped.into_iter().map(|socket| TransportEvent::Closed { socket }).collect()
    }

    /// Fire timers due at `now`, earliest first.
    pub fn fire_due(&mut self, now: SimInstant) -> Vec<TransportEvent> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers).into_iter().partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by_key(|t| t.due);

        due.into_iter()
            .map(|t| TransportEvent::ReconnectDue { generation: t.generation })
            .collect()
    }

    /// Earliest pending timer.
    pub fn next_timer(&self) -> Option<SimInstant> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Sockets currently open.
    pub fn live(&self) -> impl Iterator<Item = SocketId> + '_ {
        self.live.iter().copied()
    }

    /// Number of sockets currently open.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Every open the client requested, in order.
    pub fn opened(&self) -> &[SocketRecord] {
        &self.opened
    }

    /// Every frame the client wrote, in order.
    pub fn sent(&self) -> &[(SocketId, String)] {
        &self.sent
    }

    /// Every reconnect delay the client scheduled, in order.
    pub fn scheduled_delays(&self) -> &[Duration] {
        &self.scheduled
    }
}
