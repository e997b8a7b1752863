use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::instant::{format_instant, Instant};

/// Half-open interval `[from, until)` during which a resource had one
/// stable state (a memento).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionRange {
    pub from: Instant,
    pub until: Instant,
}

impl VersionRange {
    /// Create a range; `until` must be strictly after `from`.
    pub fn new(from: Instant, until: Instant) -> Result<Self, TypeError> {
        if until <= from {
            return Err(TypeError::InvalidRange {
                from: format_instant(&from),
                until: format_instant(&until),
            });
        }
        Ok(Self { from, until })
    }

    /// Whether `instant` falls inside the interval.
    pub fn contains(&self, instant: &Instant) -> bool {
        &self.from <= instant && instant < &self.until
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            format_instant(&self.from),
            format_instant(&self.until)
        )
    }
}
