use thiserror::Error;

/// Storage backend failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Underlying database or file error.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// Stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend cannot be used at all (disabled, poisoned, quota).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
