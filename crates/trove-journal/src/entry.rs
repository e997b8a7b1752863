//! Line grammar of a journal file.
//!
//! ```text
//! BEGIN # 2017-02-16T11:15:03Z            (optionally: BEGIN # <time> # <key>)
//! D <canonical quad text>
//! A <canonical quad text>
//! END # 2017-02-16T11:15:03Z
//! ```

use tracing::warn;
use trove_types::{format_instant, parse_instant, Instant};

const COMMENT_DELIM: &str = " # ";
const BEGIN: &str = "BEGIN # ";
const END: &str = "END # ";
const DELETE: &str = "D ";
const ADD: &str = "A ";

/// One parsed journal line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry<'a> {
    /// Start of a transaction, with its optional idempotency key.
    Begin {
        time: Instant,
        key: Option<&'a str>,
    },
    /// Commit point of a transaction.
    End { time: Instant },
    /// Quad text removed by the enclosing transaction.
    Delete(&'a str),
    /// Quad text added by the enclosing transaction.
    Add(&'a str),
}

impl<'a> Entry<'a> {
    /// Parse a line. Blank, unknown, and malformed lines yield `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        if let Some(rest) = line.strip_prefix(BEGIN) {
            let mut fields = rest.splitn(2, COMMENT_DELIM);
            let time = marker_time(line, fields.next()?)?;
            let key = fields.next().map(str::trim).filter(|k| !k.is_empty());
            Some(Self::Begin { time, key })
        } else if let Some(rest) = line.strip_prefix(END) {
            let stamp = rest.split(COMMENT_DELIM).next()?;
            Some(Self::End {
                time: marker_time(line, stamp)?,
            })
        } else if let Some(quad) = line.strip_prefix(DELETE) {
            Some(Self::Delete(quad))
        } else {
            line.strip_prefix(ADD).map(Self::Add)
        }
    }
}

fn marker_time(line: &str, stamp: &str) -> Option<Instant> {
    match parse_instant(stamp) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!(line, error = %e, "malformed journal marker; skipping");
            None
        }
    }
}

pub(crate) fn begin_marker(time: &Instant, key: Option<&str>) -> String {
    match key {
        Some(key) => format!("{BEGIN}{}{COMMENT_DELIM}{key}", format_instant(time)),
        None => format!("{BEGIN}{}", format_instant(time)),
    }
}

pub(crate) fn end_marker(time: &Instant) -> String {
    format!("{END}{}", format_instant(time))
}

pub(crate) fn delete_line(quad_text: &str) -> String {
    format!("{DELETE}{quad_text}")
}

pub(crate) fn add_line(quad_text: &str) -> String {
    format!("{ADD}{quad_text}")
}
