use std::path::PathBuf;

use chrono::Utc;
use tracing::debug;
use trove_codec::{NQuadsCodec, QuadCodec};
use trove_journal::{resource_directory, Journal, JournalResult, StorageConfig};
use trove_types::{Dataset, GraphTag, Instant, Triple, VersionRange};

use crate::cache;
use crate::error::CacheResult;
use crate::snapshot::ResourceSnapshot;

/// A resolved resource: either served from its cache files or rebuilt from
/// its journal.
#[derive(Clone, Debug)]
pub enum Resource {
    Cached {
        directory: PathBuf,
        snapshot: ResourceSnapshot,
    },
    Reconstructed {
        snapshot: ResourceSnapshot,
        quads: Dataset,
    },
}

impl Resource {
    pub fn snapshot(&self) -> &ResourceSnapshot {
        match self {
            Self::Cached { snapshot, .. } | Self::Reconstructed { snapshot, .. } => snapshot,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }

    /// Triples in the requested categories.
    pub fn triples<'a>(
        &'a self,
        codec: &'a dyn QuadCodec,
        categories: &'a [GraphTag],
    ) -> CacheResult<Box<dyn Iterator<Item = Triple> + 'a>> {
        match self {
            Self::Cached { directory, .. } => {
                Ok(Box::new(cache::stream(directory, codec, categories)?))
            }
            Self::Reconstructed { quads, .. } => Ok(Box::new(
                quads
                    .iter()
                    .filter(move |q| categories.contains(&q.graph))
                    .map(|q| q.as_triple()),
            )),
        }
    }
}

/// Identifier-level access to resources under a storage configuration.
///
/// Reads of the present consult the cache first and fall back to the
/// journal; reads of the past always replay the journal.
#[derive(Clone, Debug)]
pub struct ResourceStore<C = NQuadsCodec> {
    config: StorageConfig,
    codec: C,
}

impl<C: QuadCodec> ResourceStore<C> {
    pub fn new(config: StorageConfig, codec: C) -> Self {
        Self { config, codec }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// The resource directory, created if absent.
    pub fn directory(&self, identifier: &str) -> CacheResult<PathBuf> {
        Ok(resource_directory(&self.config, identifier)?)
    }

    pub fn journal(&self, identifier: &str) -> CacheResult<Journal> {
        Ok(Journal::in_directory(&self.directory(identifier)?))
    }

    /// Current state of a resource, or `None` if it does not exist.
    pub fn get(&self, identifier: &str) -> CacheResult<Option<Resource>> {
        let directory = self.directory(identifier)?;
        if let Some(snapshot) = cache::load(&directory, identifier) {
            return Ok(Some(Resource::Cached {
                directory,
                snapshot,
            }));
        }
        debug!(identifier, "cache miss; reconstructing from journal");
        self.reconstruct(&Journal::in_directory(&directory), identifier, Utc::now())
    }

    /// State of a resource at `time`, or `None` if it did not exist then.
    pub fn get_at(&self, identifier: &str, time: Instant) -> CacheResult<Option<Resource>> {
        let journal = self.journal(identifier)?;
        self.reconstruct(&journal, identifier, time)
    }

    fn reconstruct(
        &self,
        journal: &Journal,
        identifier: &str,
        time: Instant,
    ) -> CacheResult<Option<Resource>> {
        let quads: Dataset = journal
            .state_at(&self.codec, identifier, time)?
            .collect::<JournalResult<_>>()?;
        if quads.is_empty() {
            return Ok(None);
        }
        Ok(Some(Resource::Reconstructed {
            snapshot: ResourceSnapshot::interpret(identifier, &quads),
            quads,
        }))
    }

    /// Closed memento ranges, from the boundary file when the cache is
    /// complete and the file readable.
    pub fn mementos(&self, identifier: &str) -> CacheResult<Vec<VersionRange>> {
        let directory = self.directory(identifier)?;
        if cache::is_committed(&directory) {
            if let Some(ranges) = cache::read_mementos(&directory) {
                return Ok(ranges);
            }
        }
        let ranges = Journal::in_directory(&directory)
            .version_ranges(&self.codec)?
            .collect::<JournalResult<_>>()?;
        Ok(ranges)
    }

    /// Rebuild the cache files of a resource.
    pub fn materialize(&self, identifier: &str) -> CacheResult<Option<ResourceSnapshot>> {
        let directory = self.directory(identifier)?;
        cache::materialize(&directory, identifier, &self.codec)
    }
}
