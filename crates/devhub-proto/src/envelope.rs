//! The `{type, payload}` JSON envelope.
//!
//! Envelopes are the only framing on the realtime channel: no binary frames,
//! no compression, no sub-protocol. The server may coalesce several queued
//! envelopes into one text frame separated by `\n`, so [`decode_frame`]
//! splits on newlines before decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    InboundEvent,
    errors::{ProtocolError, Result},
};

/// Raw realtime envelope.
///
/// `payload` defaults to `null` when absent (the server's `pong` carries no
/// payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event tag.
    #[serde(rename = "type")]
    pub kind: String,

    /// Tag-specific payload.
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    /// Build an envelope from a tag and payload.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self { kind: kind.into(), payload }
    }

    /// Parse a single envelope from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))
    }

    /// Serialize to JSON text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

/// Decode every envelope carried by one text frame.
///
/// Blank lines are skipped. Each envelope decodes independently: one bad
/// line does not poison the others.
pub fn decode_frame(text: &str) -> Vec<Result<InboundEvent>> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(InboundEvent::decode)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_payload_defaults_to_null() {
        let envelope = Envelope::parse(r#"{"type":"pong"}"#).unwrap();
        assert_eq!(envelope.kind, "pong");
        assert_eq!(envelope.payload, Value::Null);
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(Envelope::parse("not json"), Err(ProtocolError::MalformedFrame(_))));
    }

    #[test]
    fn coalesced_frame_yields_each_envelope() {
        let frame = format!(
            "{}\n{}\n",
            json!({"type": "message_deleted", "payload": {"message_id": "1"}}),
            json!({"type": "pong"}),
        );

        let decoded = decode_frame(&frame);
        assert_eq!(decoded.len(), 2);
        assert!(matches!(decoded[0], Ok(InboundEvent::MessageDeleted(_))));
        assert!(matches!(decoded[1], Ok(InboundEvent::Pong)));
    }

    #[test]
    fn bad_line_does_not_poison_frame() {
        let frame = format!("{{broken\n{}", json!({"type": "pong"}));

        let decoded = decode_frame(&frame);
        assert!(decoded[0].is_err());
        assert!(matches!(decoded[1], Ok(InboundEvent::Pong)));
    }
}
