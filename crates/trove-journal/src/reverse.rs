//! Backward line reader.
//!
//! Reads fixed-size blocks from the end of a file toward its start and yields
//! lines last-first. The sequence is the reverse of `str::lines()` over the
//! same text: a single trailing newline does not produce an empty line, and
//! a trailing `\r` is removed from every line. Lines may span any number of
//! blocks; bytes are only decoded once a line is complete, so multi-byte
//! characters split across a block boundary survive.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Default number of bytes read per block.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Iterator over the lines of a seekable source, last line first.
///
/// Fuses after the first I/O error.
pub struct ReverseLineReader<R> {
    inner: R,
    /// Offset of the first byte not yet read into `pending`.
    position: u64,
    block_size: usize,
    /// Unconsumed bytes between `position` and the last yielded line.
    pending: Vec<u8>,
    started: bool,
    done: bool,
}

impl ReverseLineReader<File> {
    /// Open a file for backward reading with the default block size.
    pub fn open(path: &Path) -> io::Result<Self> {
        Self::new(File::open(path)?, DEFAULT_BLOCK_SIZE)
    }
}

impl<R: Read + Seek> ReverseLineReader<R> {
    pub fn new(mut inner: R, block_size: usize) -> io::Result<Self> {
        let position = inner.seek(SeekFrom::End(0))?;
        Ok(Self {
            inner,
            position,
            block_size: block_size.max(1),
            pending: Vec::new(),
            started: false,
            done: position == 0,
        })
    }

    /// Prepend the next block from the tail to `pending`.
    fn fill(&mut self) -> io::Result<()> {
        let len = self.position.min(self.block_size as u64);
        self.position -= len;
        self.inner.seek(SeekFrom::Start(self.position))?;

        let mut block = vec![0u8; len as usize];
        self.inner.read_exact(&mut block)?;

        if !self.started {
            self.started = true;
            if block.last() == Some(&b'\n') {
                block.pop();
            }
        }
        block.extend_from_slice(&self.pending);
        self.pending = block;
        Ok(())
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(newline) = self.pending.iter().rposition(|&b| b == b'\n') {
                let line = self.pending.split_off(newline + 1);
                self.pending.truncate(newline);
                return Ok(Some(decode(&line)));
            }
            if self.position == 0 {
                self.done = true;
                let line = std::mem::take(&mut self.pending);
                return Ok(Some(decode(&line)));
            }
            self.fill()?;
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl<R: Read + Seek> Iterator for ReverseLineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_line() {
            Ok(line) => line.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
