use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::TypeError;

/// A point on the UTC timeline. Journal markers and cache files carry these.
pub type Instant = DateTime<Utc>;

/// Render an instant as RFC 3339 with a `Z` suffix and only as many
/// fractional digits as the value needs.
pub fn format_instant(instant: &Instant) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse RFC 3339 text (any offset) into a UTC instant.
pub fn parse_instant(text: &str) -> Result<Instant, TypeError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TypeError::InvalidInstant {
            value: text.to_string(),
            reason: e.to_string(),
        })
}
