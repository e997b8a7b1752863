/// Errors from parsing quad text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unexpected {found:?} at byte {position}, expected {expected}")]
    Unexpected {
        found: char,
        position: usize,
        expected: &'static str,
    },

    #[error("invalid escape sequence at byte {position}")]
    InvalidEscape { position: usize },

    #[error("{term} is not allowed in the {slot} position")]
    TermNotAllowed {
        term: &'static str,
        slot: &'static str,
    },

    #[error("trailing input at byte {position}")]
    TrailingInput { position: usize },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
