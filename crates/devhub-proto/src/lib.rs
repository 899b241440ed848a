//! Wire protocol for the DevHub realtime channel.
//!
//! Every frame on the topic WebSocket is a JSON envelope
//! `{"type": string, "payload": object}`. This crate turns those envelopes
//! into closed sum types ([`InboundEvent`], [`OutboundEvent`]) so that adding
//! a new event kind is a compile-time decision, and defines the entities the
//! events carry.
//!
//! # Components
//!
//! - [`Envelope`]: the raw `{type, payload}` shape
//! - [`InboundEvent`]: server → client events, decoded by tag
//! - [`OutboundEvent`]: client → server events
//! - [`entities`]: `Message`, `Notification`, `Project` and friends, together
//!   with their partial-update patches
//!
//! # Invariants
//!
//! Each recognized tag maps to exactly one payload shape. Unrecognized tags
//! decode to [`InboundEvent::Unknown`] rather than an error, so a newer server
//! never breaks an older client.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod events;

pub use envelope::{Envelope, decode_frame};
pub use errors::{ProtocolError, Result};
pub use events::{
    EventKind, InboundEvent, MessageChange, MessageDeleted, OutboundEvent, ReactionUpdate,
    TypingUpdate,
};
