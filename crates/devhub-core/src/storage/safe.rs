//! Storage that never fails.
//!
//! [`SafeStorage`] probes its backend on first use by writing and removing a
//! sentinel key. If the probe or any later operation fails, it switches to an
//! in-memory map for the rest of the process and logs one warning. Values
//! written before the switch are not carried over.

use std::sync::{Arc, Mutex, PoisonError};

use super::{KeyValueStorage, MemoryStorage, StorageError};

/// Key written and removed to probe the backend.
pub const PROBE_KEY: &str = "__safe_storage_test__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unprobed,
    Primary,
    Fallback,
}

/// Infallible wrapper over a [`KeyValueStorage`] with an in-memory fallback.
#[derive(Debug, Clone)]
pub struct SafeStorage<S> {
    primary: S,
    fallback: MemoryStorage,
    mode: Arc<Mutex<Mode>>,
}

impl<S: KeyValueStorage> SafeStorage<S> {
    /// Wrap `primary`. Probing is deferred to the first operation.
    pub fn new(primary: S) -> Self {
        Self { primary, fallback: MemoryStorage::new(), mode: Arc::new(Mutex::new(Mode::Unprobed)) }
    }

    /// Whether the backend failed and values now live only in memory.
    pub fn is_degraded(&self) -> bool {
        self.resolve() == Mode::Fallback
    }

    fn resolve(&self) -> Mode {
        let mut mode = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        if *mode != Mode::Unprobed {
            return *mode;
        }

        let probe = self.primary.set(PROBE_KEY, "1").and_then(|()| self.primary.remove(PROBE_KEY));
        *mode = match probe {
            Ok(()) => Mode::Primary,
            Err(error) => {
                warn_fallback(&error);
                Mode::Fallback
            },
        };
        *mode
    }

    fn degrade(&self, error: &StorageError) {
        let mut mode = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        if *mode != Mode::Fallback {
            warn_fallback(error);
            *mode = Mode::Fallback;
        }
    }

    /// Value under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        if self.resolve() == Mode::Primary {
            match self.primary.get(key) {
                Ok(value) => return value,
                Err(error) => self.degrade(&error),
            }
        }
        self.fallback.get(key).ok().flatten()
    }

    /// Store `value` under `key`.
    pub fn set(&self, key: &str, value: &str) {
        if self.resolve() == Mode::Primary {
            match self.primary.set(key, value) {
                Ok(()) => return,
                Err(error) => self.degrade(&error),
            }
        }
        let _ = self.fallback.set(key, value);
    }

    /// Delete `key`.
    pub fn remove(&self, key: &str) {
        if self.resolve() == Mode::Primary {
            match self.primary.remove(key) {
                Ok(()) => return,
                Err(error) => self.degrade(&error),
            }
        }
        let _ = self.fallback.remove(key);
    }
}

fn warn_fallback(error: &StorageError) {
    tracing::warn!(%error, "storage is unavailable, falling back to in-memory storage");
}
