//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

fn first_duplicate(ids: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    ids.iter().map(String::as_str).find(|id| !seen.insert(*id))
}

/// Message ids in a client's cache are unique.
///
/// `add` on an existing id is a no-op, so no event sequence can produce a
/// duplicate row.
pub struct UniqueMessageIds;

impl Invariant for UniqueMessageIds {
    fn kind(&self) -> InvariantKind {
        InvariantKind::UniqueMessageIds
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(id) = first_duplicate(&client.message_ids) {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!("client {}: message {id} appears twice", client.id),
                });
            }
        }
        Ok(())
    }
}

/// Notification ids in a client's feed are unique.
pub struct UniqueNotificationIds;

impl Invariant for UniqueNotificationIds {
    fn kind(&self) -> InvariantKind {
        InvariantKind::UniqueNotificationIds
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(id) = first_duplicate(&client.notification_ids) {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!("client {}: notification {id} appears twice", client.id),
                });
            }
        }
        Ok(())
    }
}

/// A client never holds more than one open socket.
///
/// Replacing the subscription closes the old socket before the new one opens.
pub struct AtMostOneLiveSocket;

impl Invariant for AtMostOneLiveSocket {
    fn kind(&self) -> InvariantKind {
        InvariantKind::AtMostOneLiveSocket
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.live_sockets > 1 {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!("client {}: {} live sockets", client.id, client.live_sockets),
                });
            }
        }
        Ok(())
    }
}

/// With no topic mounted the chat holds no messages and no typists.
pub struct ClosedTopicIsEmpty;

impl Invariant for ClosedTopicIsEmpty {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ClosedTopicIsEmpty
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.topic.is_none() && (!client.message_ids.is_empty() || !client.typing.is_empty()) {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "client {}: no topic but {} messages and {} typists",
                        client.id,
                        client.message_ids.len(),
                        client.typing.len()
                    ),
                });
            }
        }
        Ok(())
    }
}
