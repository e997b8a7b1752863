use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid instant {value:?}: {reason}")]
    InvalidInstant { value: String, reason: String },

    #[error("unknown graph category: {0}")]
    UnknownCategory(String),

    #[error("invalid version range: from={from}, until={until}")]
    InvalidRange { from: String, until: String },
}
