//! Canonical quad-text codec.
//!
//! Journals and cache dumps store one quad per line in canonical N-Quads
//! form. Components never reach for a global parser; they are handed a
//! [`QuadCodec`] value and use it for every encode and decode.

pub mod error;
pub mod nquads;

use trove_types::Quad;

pub use error::{CodecError, CodecResult};
pub use nquads::NQuadsCodec;

/// Encode quads to a single line of text and parse them back.
pub trait QuadCodec: Send + Sync {
    /// Canonical text of `quad`, without a trailing newline.
    fn encode(&self, quad: &Quad) -> String;

    /// Parse one line. Malformed input yields `None`; it never panics.
    fn decode(&self, line: &str) -> Option<Quad>;
}
