//! File names inside a resource directory.

use std::path::{Path, PathBuf};

/// The patch journal; the only authoritative file.
pub const RESOURCE_JOURNAL: &str = "resource.rdfp";

/// Structured snapshot document (cache).
pub const RESOURCE_CACHE: &str = "resource.json";

/// Flattened quad dump (cache).
pub const RESOURCE_QUADS: &str = "resource.nq";

/// Memento boundary timestamps (cache).
pub const MEMENTO_CACHE: &str = "memento.cache";

pub fn journal_path(directory: &Path) -> PathBuf {
    directory.join(RESOURCE_JOURNAL)
}
