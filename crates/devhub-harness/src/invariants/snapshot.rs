//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::{ops::Sub, time::Duration};

use devhub_app::App;

/// Snapshot of the entire system state.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, client: ClientSnapshot) {
        self.clients.push(client);
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client identifier.
    pub id: u64,
    /// Mounted topic. `None` if no topic is open.
    pub topic: Option<String>,
    /// Message ids in display order.
    pub message_ids: Vec<String>,
    /// Users shown as typing.
    pub typing: Vec<String>,
    /// Notification ids in arrival order.
    pub notification_ids: Vec<String>,
    /// Sockets open on the server side for this client.
    pub live_sockets: usize,
}

impl ClientSnapshot {
    /// Capture `app` together with the number of live sockets.
    pub fn from_app<I>(id: u64, app: &App<I>, live_sockets: usize) -> Self
    where
        I: Copy + Ord + Sub<Output = Duration>,
    {
        let chat = app.chat();
        Self {
            id,
            topic: chat.topic_id().map(str::to_string),
            message_ids: chat.messages().iter().map(|m| m.id.clone()).collect(),
            typing: chat.typing().iter().map(|t| t.user_id.clone()).collect(),
            notification_ids: app.notifications().store().cache().ids().map(str::to_string).collect(),
            live_sockets,
        }
    }
}
