//! Transport events and actions.

use std::time::Duration;

use devhub_core::SocketId;

/// What the driver reports back to the client.
///
/// Every socket callback carries the id from the [`TransportAction::Open`]
/// that created the socket. Reports for sockets the client already replaced
/// or closed are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Socket handshake completed.
    Opened {
        /// Socket that opened.
        socket: SocketId,
    },

    /// Text frame received.
    Text {
        /// Receiving socket.
        socket: SocketId,
        /// Frame contents.
        text: String,
    },

    /// Socket error. A `Closed` report is expected to follow.
    Error {
        /// Failing socket.
        socket: SocketId,
        /// Error description.
        message: String,
    },

    /// Socket closed, or failed to open.
    Closed {
        /// Closed socket.
        socket: SocketId,
    },

    /// A [`TransportAction::Schedule`] timer fired.
    ReconnectDue {
        /// Generation from the schedule action.
        generation: u64,
    },

    /// Periodic maintenance (heartbeats).
    Tick,
}

/// Work the client asks the driver to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportAction {
    /// Open a WebSocket.
    Open {
        /// Id to tag this socket's reports with.
        socket: SocketId,
        /// Endpoint URL (carries the token).
        url: String,
    },

    /// Close a socket and stop reporting on it.
    Close {
        /// Socket to close.
        socket: SocketId,
    },

    /// Write a text frame.
    Send {
        /// Target socket.
        socket: SocketId,
        /// JSON envelope.
        text: String,
    },

    /// Report [`TransportEvent::ReconnectDue`] after `delay`.
    Schedule {
        /// Generation to report back.
        generation: u64,
        /// How long to wait.
        delay: Duration,
    },
}
