//! Point-in-time reconstruction by backward journal scan.
//!
//! Walking from the newest line to the oldest, transactions are framed by
//! their `END` (seen first) and `BEGIN` (seen last) markers. Scanning starts
//! inactive; the first `END` at or before the target instant activates it
//! for the rest of the scan. Inside an active frame:
//!
//! - `D` lines add their quad to the deleted set;
//! - `A` lines emit their quad unless it is in the deleted set or was
//!   already emitted.
//!
//! A later deletion therefore hides every earlier addition of the same quad,
//! while an addition after the deletion is met first and emitted. Lines
//! outside a frame belong to transactions that never committed and are
//! ignored.
//!
//! The newest applied `BEGIN` whose transaction (or any later applied one)
//! touched a quad outside the inbound-reference graph yields one synthetic
//! server-managed `dc:modified` quad carrying that marker's timestamp.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek};

use tracing::{debug, warn};
use trove_codec::QuadCodec;
use trove_types::vocab::dc;
use trove_types::{GraphTag, Instant, Quad, Term};

use crate::entry::Entry;
use crate::error::JournalResult;
use crate::reverse::ReverseLineReader;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    /// Between transactions, or inside one with no `END`.
    Outside,
    /// Inside a committed transaction newer than the target instant.
    Skipping,
    /// Inside a committed transaction being applied.
    Applying,
}

/// Lazy, single-pass sequence of the quads in effect at an instant.
///
/// Yields each quad at most once. Fuses after the first read error.
pub struct StateReader<'c, R = File> {
    lines: Option<ReverseLineReader<R>>,
    codec: &'c dyn QuadCodec,
    subject: Term,
    time: Instant,
    frame: Frame,
    active: bool,
    deleted: HashSet<Quad>,
    emitted: HashSet<Quad>,
    observed: bool,
    modified_emitted: bool,
}

impl<'c, R: Read + Seek> StateReader<'c, R> {
    /// Reader over `lines`; `None` stands for a journal that does not exist
    /// and produces an empty sequence.
    pub fn new(
        lines: Option<ReverseLineReader<R>>,
        codec: &'c dyn QuadCodec,
        identifier: &str,
        time: Instant,
    ) -> Self {
        Self {
            lines,
            codec,
            subject: Term::iri(identifier),
            time,
            frame: Frame::Outside,
            active: false,
            deleted: HashSet::new(),
            emitted: HashSet::new(),
            observed: false,
            modified_emitted: false,
        }
    }

    /// Process one line, returning the quad it emits, if any.
    fn step(&mut self, line: &str) -> Option<Quad> {
        match Entry::parse(line)? {
            Entry::End { time } => {
                if self.frame != Frame::Outside {
                    warn!(%line, "END marker without matching BEGIN");
                }
                if !self.active && time <= self.time {
                    self.active = true;
                }
                self.frame = if self.active {
                    Frame::Applying
                } else {
                    Frame::Skipping
                };
                None
            }
            Entry::Begin { time, .. } => {
                let frame = std::mem::replace(&mut self.frame, Frame::Outside);
                match frame {
                    Frame::Applying if self.observed && !self.modified_emitted => {
                        self.modified_emitted = true;
                        Some(self.modified(&time))
                    }
                    Frame::Outside => {
                        debug!(%line, "ignoring uncommitted transaction");
                        None
                    }
                    _ => None,
                }
            }
            Entry::Delete(text) if self.frame == Frame::Applying => {
                let quad = self.decode(text)?;
                self.observe(&quad);
                self.deleted.insert(quad);
                None
            }
            Entry::Add(text) if self.frame == Frame::Applying => {
                let quad = self.decode(text)?;
                self.observe(&quad);
                if self.deleted.contains(&quad) || !self.emitted.insert(quad.clone()) {
                    return None;
                }
                Some(quad)
            }
            Entry::Delete(_) | Entry::Add(_) => None,
        }
    }

    fn decode(&self, text: &str) -> Option<Quad> {
        let quad = self.codec.decode(text);
        if quad.is_none() {
            warn!(text, "skipping malformed journal quad");
        }
        quad
    }

    fn observe(&mut self, quad: &Quad) {
        if quad.graph != GraphTag::InboundReferences {
            self.observed = true;
        }
    }

    fn modified(&self, time: &Instant) -> Quad {
        Quad::new(
            self.subject.clone(),
            Term::iri(dc::MODIFIED),
            Term::date_time(time),
            GraphTag::ServerManaged,
        )
    }
}

impl<R: Read + Seek> Iterator for StateReader<'_, R> {
    type Item = JournalResult<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.as_mut()?.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.lines = None;
                    return Some(Err(e.into()));
                }
                None => {
                    self.lines = None;
                    return None;
                }
            };
            if let Some(quad) = self.step(&line) {
                return Some(Ok(quad));
            }
        }
    }
}
