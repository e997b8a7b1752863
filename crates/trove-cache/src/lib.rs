//! Derived resource state for trove.
//!
//! Journals are authoritative but slow to replay; this crate materializes
//! the current state of a resource next to its journal so reads of the
//! present are cheap. Nothing here is ever trusted over the journal: every
//! cache read that fails falls back to reconstruction.
//!
//! # Key Types
//!
//! - [`ResourceSnapshot`] -- named properties interpreted from a quad set
//! - [`materialize`] / [`load`] / [`stream`] -- cache files of one resource
//! - [`ResourceStore`] -- identifier lookup, cache first, journal second

pub mod cache;
pub mod error;
pub mod snapshot;
pub mod store;

pub use cache::{format_mementos, is_committed, load, materialize, read_mementos, stream};
pub use error::{CacheError, CacheResult};
pub use snapshot::{BinaryDescriptor, ResourceSnapshot};
pub use store::{Resource, ResourceStore};
