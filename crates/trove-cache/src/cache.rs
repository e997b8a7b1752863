//! Cache files of one resource directory.
//!
//! | File | Content |
//! |------|---------|
//! | `resource.json` | [`ResourceSnapshot`] document |
//! | `resource.nq` | current quads, one canonical line each |
//! | `memento.cache` | first range start, then every range end |

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use chrono::Utc;
use tracing::{debug, warn};
use trove_codec::QuadCodec;
use trove_journal::layout::{MEMENTO_CACHE, RESOURCE_CACHE, RESOURCE_QUADS};
use trove_journal::{Journal, JournalResult};
use trove_types::{format_instant, parse_instant, Dataset, GraphTag, Instant, Triple, VersionRange};

use crate::error::CacheResult;
use crate::snapshot::ResourceSnapshot;

/// Rebuild every cache file of a resource from its journal.
///
/// Returns the snapshot written, or `None` when the journal holds no state
/// for the resource; any earlier snapshot is withdrawn and nothing new is
/// written.
pub fn materialize(
    directory: &Path,
    identifier: &str,
    codec: &dyn QuadCodec,
) -> CacheResult<Option<ResourceSnapshot>> {
    let journal = Journal::in_directory(directory);
    let now = Utc::now();
    let quads: Dataset = journal
        .state_at(codec, identifier, now)?
        .collect::<JournalResult<_>>()?;
    // resource.json marks a complete cache: removed first, written last.
    remove_if_present(&directory.join(RESOURCE_CACHE))?;
    if quads.is_empty() {
        debug!(identifier, "no state to materialize");
        return Ok(None);
    }

    let mut dump = String::new();
    for quad in quads.iter() {
        dump.push_str(&codec.encode(quad));
        dump.push('\n');
    }
    write_replacing(&directory.join(RESOURCE_QUADS), dump.as_bytes())?;

    let ranges = journal.version_ranges(codec)?.collect::<JournalResult<Vec<_>>>()?;
    write_replacing(&directory.join(MEMENTO_CACHE), format_mementos(&ranges).as_bytes())?;

    let snapshot = ResourceSnapshot::interpret(identifier, &quads);
    write_replacing(&directory.join(RESOURCE_CACHE), &serde_json::to_vec(&snapshot)?)?;

    debug!(
        identifier,
        quads = quads.len(),
        mementos = ranges.len(),
        "materialized resource cache"
    );
    Ok(Some(snapshot))
}

/// Write through a sibling temporary file so readers never observe a
/// half-written cache file.
fn write_replacing(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    fs::write(&staging, contents)?;
    fs::rename(&staging, path)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Whether a resource directory holds a complete cache: the snapshot
/// document and the quad dump it was written after.
pub fn is_committed(directory: &Path) -> bool {
    directory.join(RESOURCE_CACHE).is_file() && directory.join(RESOURCE_QUADS).is_file()
}

/// Read the cached snapshot document. Any failure, including a snapshot
/// whose quad dump is missing, is a cache miss.
pub fn load(directory: &Path, identifier: &str) -> Option<ResourceSnapshot> {
    let path = directory.join(RESOURCE_CACHE);
    if path.is_file() && !directory.join(RESOURCE_QUADS).is_file() {
        warn!(path = %path.display(), "cached resource has no quad dump");
        return None;
    }
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            if e.kind() == io::ErrorKind::NotFound {
                debug!(identifier, "no cached resource");
            } else {
                warn!(path = %path.display(), error = %e, "error reading cached resource");
            }
            return None;
        }
    };
    match serde_json::from_slice::<ResourceSnapshot>(&bytes) {
        Ok(snapshot) if snapshot.id == identifier => Some(snapshot),
        Ok(snapshot) => {
            warn!(path = %path.display(), cached = %snapshot.id, identifier, "cached resource belongs to another identifier");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "error parsing cached resource");
            None
        }
    }
}

/// Triples of the cached quad dump whose graph is in `categories`.
///
/// Unparseable lines are skipped. A missing dump yields nothing.
pub fn stream<'a>(
    directory: &Path,
    codec: &'a dyn QuadCodec,
    categories: &'a [GraphTag],
) -> CacheResult<impl Iterator<Item = Triple> + 'a> {
    let path = directory.join(RESOURCE_QUADS);
    let reader = match File::open(&path) {
        Ok(file) => Some(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    Ok(reader
        .into_iter()
        .flat_map(|reader| reader.split(b'\n'))
        .map_while(move |line| {
            line.inspect_err(|e| warn!(path = %path.display(), error = %e, "cached quad dump unreadable"))
                .ok()
        })
        .filter_map(move |line| codec.decode(&String::from_utf8_lossy(&line)))
        .filter(move |quad| categories.contains(&quad.graph))
        .map(|quad| quad.into_triple()))
}

/// Serialize contiguous ranges as the memento boundary file.
pub fn format_mementos(ranges: &[VersionRange]) -> String {
    let mut out = String::new();
    let mut push = |instant: &Instant| {
        out.push_str(&format_instant(instant));
        out.push('\n');
    };
    if let Some(first) = ranges.first() {
        push(&first.from);
    }
    for range in ranges {
        push(&range.until);
    }
    out
}

/// Read the memento boundary file back into ranges. Missing or malformed
/// files are a cache miss.
pub fn read_mementos(directory: &Path) -> Option<Vec<VersionRange>> {
    let path = directory.join(MEMENTO_CACHE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "error reading memento cache");
            }
            return None;
        }
    };

    let boundaries = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_instant)
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| warn!(path = %path.display(), error = %e, "malformed memento cache"))
        .ok()?;

    match boundaries.len() {
        0 => Some(Vec::new()),
        1 => {
            warn!(path = %path.display(), "memento cache has a start but no end");
            None
        }
        _ => boundaries
            .windows(2)
            .map(|pair| VersionRange::new(pair[0], pair[1]))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "malformed memento cache"))
            .ok(),
    }
}
