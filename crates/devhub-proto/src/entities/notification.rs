//! User notifications.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A notification addressed to the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Server-issued identifier.
    pub id: String,
    /// Recipient.
    #[serde(default)]
    pub user_id: String,
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub body: String,
    /// In-app link to the subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Notification kind (`message`, `mention`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Kind-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Whether the user has seen it.
    #[serde(default)]
    pub is_read: bool,
    /// When it was marked read (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
}

/// Partial update of a [`Notification`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPatch {
    /// New headline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// New link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// New read flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    /// New read timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
}
