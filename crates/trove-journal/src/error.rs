use std::io;
use std::path::PathBuf;

/// Errors produced by journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// I/O error reading or appending a journal file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The identifier could not be resolved to a storage location.
    #[error("configuration resolution failed: {0}")]
    Config(#[from] ConfigError),
}

/// Failures resolving an identifier to a storage root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The identifier has no authority segment to use as a repository key.
    #[error("identifier {0:?} has no repository key")]
    MissingRepositoryKey(String),

    /// No storage root is configured for the repository key.
    #[error("no storage root configured for repository {0:?}")]
    NoStorageRoot(String),

    /// The configured root is not a usable path or file URI.
    #[error("invalid storage root {root:?}: {reason}")]
    InvalidRoot { root: String, reason: String },

    /// The configuration document could not be read or parsed.
    #[error("cannot load storage config {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Convenience alias used throughout the journal crate.
pub type JournalResult<T> = std::result::Result<T, JournalError>;
