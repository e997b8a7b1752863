//! Foundation types for trove.
//!
//! This crate provides the data model shared by every other trove crate:
//! RDF terms, graph-tagged quads, in-memory datasets, memento version ranges,
//! and the vocabulary constants the store interprets.
//!
//! # Key Types
//!
//! - [`Term`] — IRI, blank node, or literal, with its canonical text form
//! - [`GraphTag`] — closed classification of a quad's provenance
//! - [`Quad`] / [`Triple`] — statements with and without a graph tag
//! - [`Dataset`] — ordered set of quads carried by change events
//! - [`VersionRange`] — half-open `[from, until)` memento interval

pub mod dataset;
pub mod error;
pub mod graph;
pub mod instant;
pub mod quad;
pub mod range;
pub mod term;
pub mod vocab;

pub use dataset::Dataset;
pub use error::TypeError;
pub use graph::GraphTag;
pub use instant::{format_instant, parse_instant, Instant};
pub use quad::{Quad, Triple};
pub use range::VersionRange;
pub use term::{Literal, Term};
