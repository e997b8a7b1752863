//! Append-only patch journals for trove.
//!
//! Every resource owns one journal file: a sequence of transactions, each a
//! `BEGIN` marker, deleted quads, added quads, and an `END` marker carrying
//! the same timestamp. The journal is the only source of truth for a
//! resource; everything else is derived from it.
//!
//! # Layout
//!
//! - [`partition`] / [`resource_directory`] -- map an identifier to its
//!   hash-sharded directory under a configured storage root
//! - [`layout`] -- file names inside a resource directory
//!
//! # Reading
//!
//! - [`Journal::state_at`] -- reverse scan producing the quads in effect at
//!   an instant ([`StateReader`])
//! - [`Journal::version_ranges`] -- forward scan producing memento intervals
//!   ([`VersionMapReader`])
//! - [`ReverseLineReader`] -- block-buffered backward line reader
//!
//! # Design Rules
//!
//! 1. Appends never rewrite or truncate existing bytes.
//! 2. A transaction exists only once its `END` marker is on disk; readers
//!    ignore unterminated regions left by crashed or in-flight writers.
//! 3. Reads take no locks and may run alongside an append.
//! 4. Serializing writers to one resource is the caller's job.

pub mod config;
pub mod entry;
pub mod error;
pub mod journal;
pub mod layout;
pub mod partition;
pub mod reconstruct;
pub mod reverse;
pub mod timemap;

pub use config::StorageConfig;
pub use entry::Entry;
pub use error::{ConfigError, JournalError, JournalResult};
pub use journal::{Journal, JournalOptions, Transaction};
pub use partition::{partition, repository_key, resource_directory};
pub use reconstruct::StateReader;
pub use reverse::ReverseLineReader;
pub use timemap::VersionMapReader;
