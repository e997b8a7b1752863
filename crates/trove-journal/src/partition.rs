//! Hash-sharded directory layout for resource identifiers.
//!
//! `partition("trellis:repository/resource")` yields a path such as
//! `4a/9f/0c/<64 hex chars>`: up to [`MAX_SEGMENTS`] two-character segments
//! of the identifier's CRC-32, then the full 256-bit BLAKE3 digest of the
//! identifier as the leaf. Two identifiers whose CRCs collide still land in
//! different leaves.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{ConfigError, JournalResult};

/// Length of each CRC directory segment.
pub const SEGMENT_LENGTH: usize = 2;

/// Maximum number of CRC segments, bounding directory fan-out depth.
pub const MAX_SEGMENTS: usize = 3;

/// Deterministic relative directory for an identifier.
pub fn partition(identifier: &str) -> PathBuf {
    let crc = format!("{:x}", crc32fast::hash(identifier.as_bytes()));

    let mut path: PathBuf = crc
        .as_bytes()
        .chunks_exact(SEGMENT_LENGTH)
        .take(MAX_SEGMENTS)
        .filter_map(|segment| std::str::from_utf8(segment).ok())
        .collect();

    let digest = blake3::hash(identifier.as_bytes());
    path.push(hex::encode(digest.as_bytes()));
    path
}

/// Repository key of an identifier: the authority of its scheme-specific
/// part, e.g. `repository` for `trellis:repository/resource` and
/// `example.org` for `http://example.org/a`.
pub fn repository_key(identifier: &str) -> Result<&str, ConfigError> {
    let missing = || ConfigError::MissingRepositoryKey(identifier.to_string());
    let (_, rest) = identifier.split_once(':').ok_or_else(missing)?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let key = rest.split('/').next().unwrap_or_default();
    if key.is_empty() {
        return Err(missing());
    }
    Ok(key)
}

/// Resolve (and create if absent) the directory holding an identifier's
/// journal and cache files.
///
/// Fails with [`ConfigError`] when the identifier's repository has no
/// configured root; callers must not fall back to a default location.
pub fn resource_directory(config: &StorageConfig, identifier: &str) -> JournalResult<PathBuf> {
    let repository = repository_key(identifier)?;
    let root = config.root(repository)?;
    let directory = root.join(partition(identifier));
    ensure_directory(&directory)?;
    Ok(directory)
}

fn ensure_directory(directory: &Path) -> JournalResult<()> {
    if !directory.is_dir() {
        fs::create_dir_all(directory)?;
        debug!(directory = %directory.display(), "created resource directory");
    }
    Ok(())
}
