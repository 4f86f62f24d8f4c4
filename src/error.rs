
//! Error type for all codec operations.
//! The codecs never retry and never silently truncate:
//! every structural mismatch is surfaced as one of these kinds.

use std::fmt;


/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A result with no useful value.
pub type UnitResult = Result<()>;


/// Why a codec operation failed.
/// Each variant carries a human-readable description of the offending data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {

    /// The end of the input buffer was reached before a complete record.
    TruncatedInput(String),

    /// The input contains a structurally impossible encoding,
    /// for example a bad command code or a missing terminator.
    CorruptStream(String),

    /// The caller-supplied output buffer is smaller than the produced output.
    OutputOverflow(String),

    /// A source character has no charmap entry and is not a valid `{HH}` escape.
    InvalidGlyph(String),

    /// An encoded string exceeds the representable length.
    Overflow(String),

    /// A precondition on the requested operation does not hold,
    /// for example a palette index greater than 3.
    InvalidConfiguration(String),
}


impl Error {
    pub(crate) fn truncated(message: impl Into<String>) -> Self {
        Error::TruncatedInput(message.into())
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Error::CorruptStream(message.into())
    }

    pub(crate) fn overflowing_output(message: impl Into<String>) -> Self {
        Error::OutputOverflow(message.into())
    }

    pub(crate) fn invalid_glyph(message: impl Into<String>) -> Self {
        Error::InvalidGlyph(message.into())
    }

    pub(crate) fn overlong(message: impl Into<String>) -> Self {
        Error::Overflow(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}


impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TruncatedInput(message) => write!(formatter, "truncated input: {}", message),
            Error::CorruptStream(message) => write!(formatter, "corrupt stream: {}", message),
            Error::OutputOverflow(message) => write!(formatter, "output overflow: {}", message),
            Error::InvalidGlyph(message) => write!(formatter, "invalid glyph: {}", message),
            Error::Overflow(message) => write!(formatter, "overflow: {}", message),
            Error::InvalidConfiguration(message) => write!(formatter, "invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for Error {}
