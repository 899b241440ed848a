//! Entities carried by realtime events and REST seeds.
//!
//! Field names follow the backend's JSON. Fields the backend omits or sends
//! as `null` deserialize to their defaults, so a partially populated object
//! still decodes.
//!
//! Each entity has a patch type whose fields are all optional. Applying a
//! patch replaces exactly the fields it carries (shallow merge); the cache
//! layer in `devhub-core` does the applying.

mod message;
mod notification;
mod project;
mod user;

pub use message::{Message, MessageAuthor, MessagePatch, ReactionGroup};
pub use notification::{Notification, NotificationPatch};
pub use project::{Project, ProjectPatch, Topic, Workspace, WorkspacePatch};
pub use user::User;
