//! Chat messages and reactions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat message in a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Server-issued identifier, unique within a topic.
    pub id: String,
    /// Topic the message belongs to.
    #[serde(default)]
    pub topic_id: String,
    /// Author. `None` for system messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Message body.
    #[serde(default)]
    pub content: String,
    /// Message kind: `text`, `file`, `system`, `code` or `integration`.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Kind-specific metadata (file info, code language, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Parent message when this is a thread reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    #[serde(default)]
    pub updated_at: String,
    /// Embedded author profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<MessageAuthor>,
    /// Reactions grouped by emoji.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<ReactionGroup>>,
}

fn default_kind() -> String {
    "text".to_string()
}

impl Message {
    /// Plain text message with only the fields needed for display.
    pub fn text(id: impl Into<String>, topic_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic_id: topic_id.into(),
            user_id: None,
            content: content.into(),
            kind: default_kind(),
            metadata: None,
            parent_id: None,
            created_at: String::new(),
            updated_at: String::new(),
            user: None,
            reactions: None,
        }
    }
}

/// Author profile embedded in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    /// User identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Unique handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Reactions of one emoji on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionGroup {
    /// The emoji.
    pub emoji: String,
    /// Number of users who reacted.
    pub count: u32,
    /// Ids of the users who reacted.
    #[serde(default)]
    pub users: Vec<String>,
    /// Whether the current user is among them.
    #[serde(default)]
    pub has_self: bool,
}

/// Partial update of a [`Message`].
///
/// Absent fields are left untouched when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePatch {
    /// New topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    /// New author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New kind.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// New metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// New parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// New creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// New update timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// New author profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<MessageAuthor>,
    /// New reaction groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<ReactionGroup>>,
}

impl MessagePatch {
    /// Patch that only replaces the body.
    pub fn content(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), ..Self::default() }
    }

    /// Patch that only replaces the reaction groups.
    pub fn reactions(reactions: Vec<ReactionGroup>) -> Self {
        Self { reactions: Some(reactions), ..Self::default() }
    }
}

impl From<Message> for MessagePatch {
    fn from(message: Message) -> Self {
        Self {
            topic_id: Some(message.topic_id),
            user_id: message.user_id,
            content: Some(message.content),
            kind: Some(message.kind),
            metadata: message.metadata,
            parent_id: message.parent_id,
            created_at: Some(message.created_at),
            updated_at: Some(message.updated_at),
            user: message.user,
            reactions: message.reactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sparse_message_decodes_with_defaults() {
        let message: Message = serde_json::from_value(json!({"id": "1", "content": "hi"})).unwrap();

        assert_eq!(message.id, "1");
        assert_eq!(message.kind, "text");
        assert!(message.reactions.is_none());
    }

    #[test]
    fn patch_keeps_only_present_fields() {
        let patch: MessagePatch =
            serde_json::from_value(json!({"content": "edited", "parent_id": null})).unwrap();

        assert_eq!(patch.content.as_deref(), Some("edited"));
        assert_eq!(patch.parent_id, None);
        assert_eq!(patch.topic_id, None);
    }
}
