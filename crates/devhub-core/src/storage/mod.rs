//! Key-value storage for the little client state that outlives a session.
//!
//! Only the auth token, the signed-in user and the theme are persisted. Caches
//! never are. The trait is synchronous; backends share their state internally
//! so clones see the same data.

mod error;
mod memory;
mod redb;
mod safe;

pub use error::StorageError;
pub use memory::MemoryStorage;
pub use safe::SafeStorage;

pub use self::redb::RedbStorage;

/// String key-value storage backend.
pub trait KeyValueStorage: Clone + Send + Sync + 'static {
    /// Value under `key`. `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
