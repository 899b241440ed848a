//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding realtime frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame text is not a JSON envelope.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Tag is recognized but the payload does not match its shape.
    #[error("invalid payload for {kind}: {reason}")]
    InvalidPayload {
        /// Event tag the payload was decoded for
        kind: String,
        /// Decoder error description
        reason: String,
    },

    /// Outbound event could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ProtocolError {
    pub(crate) fn invalid_payload(kind: &str, err: &serde_json::Error) -> Self {
        Self::InvalidPayload { kind: kind.to_string(), reason: err.to_string() }
    }
}
