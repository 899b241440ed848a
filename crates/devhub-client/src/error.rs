//! Client error types.

use devhub_core::ConnectionError;
use thiserror::Error;

/// Errors returned by the realtime client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No open socket. The event was not sent and is not queued.
    #[error("websocket is not connected")]
    NotConnected,

    /// Event could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Endpoint could not be built from the configured API base.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The transport task has stopped.
    #[error("client task is no longer running")]
    Closed,
}

impl From<ConnectionError> for ClientError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::NotConnected => Self::NotConnected,
            ConnectionError::Protocol(reason) => Self::Protocol(reason),
            err @ ConnectionError::InvalidEndpoint { .. } => Self::InvalidEndpoint(err.to_string()),
        }
    }
}
