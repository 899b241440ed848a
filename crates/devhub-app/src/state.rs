//! Observable application state types.

use std::fmt;

/// Realtime status as the view presents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No topic open.
    #[default]
    Offline,
    /// First socket of a topic is opening.
    Connecting,
    /// Socket open.
    Online,
    /// Socket dropped; the client is retrying.
    Reconnecting,
    /// Retries exhausted. Selecting the topic again starts over.
    GaveUp,
}

impl ConnectionStatus {
    /// Whether realtime events are flowing.
    pub fn is_online(self) -> bool {
        self == Self::Online
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Offline => "offline",
            Self::Connecting => "connecting",
            Self::Online => "online",
            Self::Reconnecting => "reconnecting",
            Self::GaveUp => "gave up",
        };
        f.write_str(label)
    }
}
