use std::io::BufRead;

use tracing::{debug, warn};
use trove_codec::QuadCodec;
use trove_types::{Instant, VersionRange};

use crate::entry::Entry;
use crate::error::JournalResult;

/// Forward scan producing contiguous memento intervals.
///
/// Only transactions that touch a user-managed or server-managed quad open
/// or close an interval. Quad lines are decoded with the same codec the
/// reconstructor uses, so a line it would skip as malformed never makes a
/// transaction substantive here either. A `BEGIN` met while another
/// transaction is still open discards the open one; it never committed.
pub struct VersionMapReader<'c, R> {
    reader: Option<R>,
    codec: &'c dyn QuadCodec,
    buf: Vec<u8>,
    open: bool,
    substantive: bool,
    boundary: Option<Instant>,
}

impl<'c, R: BufRead> VersionMapReader<'c, R> {
    pub fn new(reader: R, codec: &'c dyn QuadCodec) -> Self {
        Self {
            reader: Some(reader),
            codec,
            buf: Vec::new(),
            open: false,
            substantive: false,
            boundary: None,
        }
    }

    /// The latest substantive commit seen so far. Once the reader is
    /// exhausted this is where the current state begins.
    pub fn boundary(&self) -> Option<Instant> {
        self.boundary
    }

    fn step(&mut self, line: &str) -> Option<VersionRange> {
        match Entry::parse(line)? {
            Entry::Begin { .. } => {
                if self.open {
                    debug!(%line, "discarding uncommitted transaction");
                }
                self.open = true;
                self.substantive = false;
            }
            Entry::Delete(text) | Entry::Add(text) => {
                if !self.open || self.substantive {
                    return None;
                }
                match self.codec.decode(text) {
                    Some(quad) => self.substantive = quad.graph.is_versioned(),
                    None => warn!(text, "skipping malformed journal quad"),
                }
            }
            Entry::End { time } => {
                let committed = std::mem::take(&mut self.open) && self.substantive;
                if !committed {
                    return None;
                }
                match self.boundary {
                    Some(prior) if time > prior => {
                        self.boundary = Some(time);
                        return Some(VersionRange {
                            from: prior,
                            until: time,
                        });
                    }
                    Some(_) => {}
                    None => self.boundary = Some(time),
                }
            }
        }
        None
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        self.buf.clear();
        if reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let bytes = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }
}

impl<'c, R> VersionMapReader<'c, R> {
    /// Reader over a journal that does not exist.
    pub fn empty(codec: &'c dyn QuadCodec) -> Self {
        Self {
            reader: None,
            codec,
            buf: Vec::new(),
            open: false,
            substantive: false,
            boundary: None,
        }
    }
}

impl<R: BufRead> Iterator for VersionMapReader<'_, R> {
    type Item = JournalResult<VersionRange>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read_line() {
                Ok(Some(line)) => {
                    if let Some(range) = self.step(&line) {
                        return Some(Ok(range));
                    }
                }
                Ok(None) => {
                    self.reader = None;
                    return None;
                }
                Err(e) => {
                    self.reader = None;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
