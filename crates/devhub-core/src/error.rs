//! Error types for the connection layer.

use devhub_proto::ProtocolError;
use thiserror::Error;

/// Errors returned by [`crate::Connection`] and endpoint configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Attempted to write while no socket is open.
    #[error("websocket is not connected")]
    NotConnected,

    /// API base URL could not be used to build a socket endpoint.
    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint {
        /// The offending URL.
        url: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Outbound event could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ConnectionError {
    /// Returns true if retrying after a reconnect may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotConnected)
    }
}

impl From<ProtocolError> for ConnectionError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}
