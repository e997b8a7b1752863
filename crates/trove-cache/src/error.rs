use std::io;

use trove_journal::JournalError;

/// Errors produced while materializing or resolving resources.
///
/// A missing or unreadable cache is not an error; it reads as a cache miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the cache crate.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
