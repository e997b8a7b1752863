use trove_cache::CacheError;
use trove_journal::JournalError;

/// Failures inside a transform. They never escape the public transform
/// functions, which log them and degrade to a no-op result.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

pub type IndexResult<T> = std::result::Result<T, IndexError>;
