//! Domain stores.
//!
//! Each store wraps a [`crate::Cache`] for one entity type and adds the few
//! operations its views need on top of the generic container. The underlying
//! cache is exposed through `cache()`/`cache_mut()` for the generic
//! `set_all`/`add`/`update`/`remove`/`clear` surface.

mod messages;
mod notifications;
mod projects;
mod workspaces;

pub use messages::MessageStore;
pub use notifications::NotificationStore;
pub use projects::ProjectStore;
pub use workspaces::WorkspaceStore;
