//! Realtime events.
//!
//! [`InboundEvent`] is the closed set of server → client events and
//! [`OutboundEvent`] the client → server set. Decoding dispatches on the
//! envelope tag through [`EventKind`]; every match over these enums is
//! exhaustive, so a new event kind forces every consumer to decide what to do
//! with it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    Envelope,
    entities::{Message, MessagePatch, Notification, ReactionGroup},
    errors::{ProtocolError, Result},
};

/// Recognized inbound event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `new_message`
    NewMessage,
    /// `message_updated`
    MessageUpdated,
    /// `message_deleted`
    MessageDeleted,
    /// `typing`
    Typing,
    /// `reaction_updated`
    ReactionUpdated,
    /// `notification_created`
    NotificationCreated,
    /// `pong`
    Pong,
}

impl EventKind {
    /// Every recognized kind.
    pub const ALL: [Self; 7] = [
        Self::NewMessage,
        Self::MessageUpdated,
        Self::MessageDeleted,
        Self::Typing,
        Self::ReactionUpdated,
        Self::NotificationCreated,
        Self::Pong,
    ];

    /// Wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewMessage => "new_message",
            Self::MessageUpdated => "message_updated",
            Self::MessageDeleted => "message_deleted",
            Self::Typing => "typing",
            Self::ReactionUpdated => "reaction_updated",
            Self::NotificationCreated => "notification_created",
            Self::Pong => "pong",
        }
    }

    /// Kind for a wire tag. `None` if the tag is not recognized.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

/// Payload of `message_updated`: the id plus whichever fields the server sent.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageChange {
    /// Message being updated.
    pub id: String,
    /// Fields to merge into the cached message.
    pub patch: MessagePatch,
}

/// Payload of `message_deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeleted {
    /// Id of the removed message.
    pub message_id: String,
}

/// Payload of `typing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingUpdate {
    /// Who is typing. The server stamps this; events without it are ignored
    /// by the view layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Display name of the typist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Started (`true`) or stopped (`false`) typing.
    #[serde(default)]
    pub is_typing: bool,
}

/// Payload of `reaction_updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionUpdate {
    /// Message whose reactions changed.
    pub message_id: String,
    /// Complete new set of reaction groups.
    #[serde(default)]
    pub reactions: Vec<ReactionGroup>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Message,
}

/// Server → client event.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A message was posted.
    NewMessage(Message),
    /// A message was edited.
    MessageUpdated(MessageChange),
    /// A message was deleted.
    MessageDeleted(MessageDeleted),
    /// Someone started or stopped typing.
    Typing(TypingUpdate),
    /// Reactions on a message changed.
    ReactionUpdated(ReactionUpdate),
    /// A notification was created for the current user.
    NotificationCreated(Notification),
    /// Heartbeat acknowledgment.
    Pong,
    /// Tag this client does not know. Carries the tag for logging.
    Unknown {
        /// The unrecognized tag.
        kind: String,
    },
}

impl InboundEvent {
    /// Decode one envelope from JSON text.
    pub fn decode(text: &str) -> Result<Self> {
        Self::from_envelope(Envelope::parse(text)?)
    }

    /// Decode from an already-parsed envelope.
    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        let Some(kind) = EventKind::from_tag(&envelope.kind) else {
            return Ok(Self::Unknown { kind: envelope.kind });
        };
        let tag = kind.as_str();
        let payload = envelope.payload;

        let event = match kind {
            EventKind::NewMessage => {
                let body: MessageBody = serde_json::from_value(payload)
                    .map_err(|e| ProtocolError::invalid_payload(tag, &e))?;
                Self::NewMessage(body.message)
            },
            EventKind::MessageUpdated => Self::MessageUpdated(decode_change(tag, payload)?),
            EventKind::MessageDeleted => Self::MessageDeleted(
                serde_json::from_value(payload).map_err(|e| ProtocolError::invalid_payload(tag, &e))?,
            ),
            EventKind::Typing => Self::Typing(
                serde_json::from_value(payload).map_err(|e| ProtocolError::invalid_payload(tag, &e))?,
            ),
            EventKind::ReactionUpdated => Self::ReactionUpdated(
                serde_json::from_value(payload).map_err(|e| ProtocolError::invalid_payload(tag, &e))?,
            ),
            EventKind::NotificationCreated => {
                // The server wraps it as `{notification: {...}}`; older builds
                // sent the bare object.
                let inner = match payload {
                    Value::Object(mut map) if map.contains_key("notification") => {
                        map.remove("notification").unwrap_or(Value::Null)
                    },
                    other => other,
                };
                Self::NotificationCreated(
                    serde_json::from_value(inner)
                        .map_err(|e| ProtocolError::invalid_payload(tag, &e))?,
                )
            },
            EventKind::Pong => Self::Pong,
        };

        Ok(event)
    }

    /// Wire tag of this event.
    pub fn kind(&self) -> &str {
        match self {
            Self::NewMessage(_) => EventKind::NewMessage.as_str(),
            Self::MessageUpdated(_) => EventKind::MessageUpdated.as_str(),
            Self::MessageDeleted(_) => EventKind::MessageDeleted.as_str(),
            Self::Typing(_) => EventKind::Typing.as_str(),
            Self::ReactionUpdated(_) => EventKind::ReactionUpdated.as_str(),
            Self::NotificationCreated(_) => EventKind::NotificationCreated.as_str(),
            Self::Pong => EventKind::Pong.as_str(),
            Self::Unknown { kind } => kind,
        }
    }

    /// Build the envelope the server would send for this event.
    pub fn to_envelope(&self) -> Result<Envelope> {
        let payload = match self {
            Self::NewMessage(message) => json!({ "message": to_value(message)? }),
            Self::MessageUpdated(change) => {
                let mut message = match to_value(&change.patch)? {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                message.insert("id".to_string(), Value::String(change.id.clone()));
                json!({ "message": message })
            },
            Self::MessageDeleted(deleted) => to_value(deleted)?,
            Self::Typing(typing) => to_value(typing)?,
            Self::ReactionUpdated(update) => to_value(update)?,
            Self::NotificationCreated(notification) => {
                json!({ "notification": to_value(notification)? })
            },
            Self::Pong | Self::Unknown { .. } => Value::Null,
        };

        Ok(Envelope::new(self.kind(), payload))
    }

    /// Encode as JSON text.
    pub fn encode(&self) -> Result<String> {
        self.to_envelope()?.to_json()
    }
}

fn decode_change(tag: &str, payload: Value) -> Result<MessageChange> {
    let invalid = |reason: &str| ProtocolError::InvalidPayload {
        kind: tag.to_string(),
        reason: reason.to_string(),
    };

    let Value::Object(mut body) = payload else {
        return Err(invalid("payload is not an object"));
    };
    let Some(message) = body.remove("message") else {
        return Err(invalid("missing field `message`"));
    };
    let Some(id) = message.get("id").and_then(Value::as_str).map(str::to_string) else {
        return Err(invalid("message without string `id`"));
    };
    let patch = serde_json::from_value(message).map_err(|e| ProtocolError::invalid_payload(tag, &e))?;

    Ok(MessageChange { id, patch })
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Client → server event.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Typing indicator for the current topic.
    Typing {
        /// Started (`true`) or stopped (`false`) typing.
        is_typing: bool,
    },
    /// Application-level heartbeat; the server answers with `pong`.
    Ping,
    /// Any other tag with a caller-built payload.
    Custom {
        /// Event tag.
        kind: String,
        /// Event payload.
        payload: Value,
    },
}

impl OutboundEvent {
    /// Wire tag of this event.
    pub fn kind(&self) -> &str {
        match self {
            Self::Typing { .. } => "typing",
            Self::Ping => "ping",
            Self::Custom { kind, .. } => kind,
        }
    }

    /// Envelope for this event.
    pub fn to_envelope(&self) -> Envelope {
        let payload = match self {
            Self::Typing { is_typing } => json!({ "is_typing": is_typing }),
            Self::Ping => json!({}),
            Self::Custom { payload, .. } => payload.clone(),
        };
        Envelope::new(self.kind(), payload)
    }

    /// Encode as JSON text.
    pub fn encode(&self) -> Result<String> {
        self.to_envelope().to_json()
    }
}
