//! Error types for the IMAP reader.

use thiserror::Error;

use crate::sexp::SexpKind;

/// Errors that can occur while reading IMAP syntax.
///
/// None of these are recoverable: once a read fails, the stream position
/// relative to response boundaries is unknown and the connection should be
/// torn down.
#[derive(Debug, Error)]
pub enum Error {
    /// End of stream or transport failure in the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed byte sequence did not match.
    #[error(
        "Malformed syntax at position {position}: expected \"{}\", got \"{}\"",
        .expected.escape_ascii(),
        .actual.escape_ascii()
    )]
    MalformedSyntax {
        /// Stream offset where the mismatched bytes started.
        position: usize,
        /// Bytes that were required.
        expected: Vec<u8>,
        /// Bytes that were read instead.
        actual: Vec<u8>,
    },

    /// A backslash inside a quoted string escaped something other than `"` or `\`.
    #[error("Invalid escape sequence at position {position}: \\{}", .byte.escape_ascii())]
    EscapeSequence {
        /// Stream offset of the escaped byte.
        position: usize,
        /// The byte following the backslash.
        byte: u8,
    },

    /// The `{n}` prefix of a literal could not be parsed.
    #[error("Invalid literal length at position {position}: {reason}")]
    LiteralLength {
        /// Stream offset where the length field started.
        position: usize,
        /// What was wrong with the field.
        reason: &'static str,
    },

    /// A literal announced more bytes than the configured maximum.
    #[error("Literal too large: {size} bytes (max {limit})")]
    LiteralTooLarge {
        /// Announced literal size.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// A string list contained something other than a string.
    #[error("List element {index} is {kind}, not string")]
    ListElementType {
        /// Zero-based index of the offending element.
        index: usize,
        /// Kind of the offending element.
        kind: SexpKind,
    },

    /// A line did not fit in the line buffer.
    #[error("Line exceeds {limit} bytes without a terminator")]
    LineTooLong {
        /// Configured maximum line length.
        limit: usize,
    },

    /// Parenthesized lists were nested deeper than the configured maximum.
    #[error("List nesting exceeds depth {limit}")]
    NestingTooDeep {
        /// Configured maximum depth.
        limit: usize,
    },

    /// A text production was not valid UTF-8.
    #[error("Invalid UTF-8 in text ending at position {position}")]
    InvalidUtf8 {
        /// Stream offset just past the offending production.
        position: usize,
    },

    /// A list element cannot start with this byte.
    #[error("Unexpected byte at position {position}: '{}'", .byte.escape_ascii())]
    UnexpectedByte {
        /// Stream offset of the byte.
        position: usize,
        /// The byte itself.
        byte: u8,
    },

    /// An S-expression had a different shape than the caller required.
    #[error("Expected {expected}, got {actual}")]
    UnexpectedKind {
        /// Kind the caller asked for.
        expected: SexpKind,
        /// Kind that was present.
        actual: SexpKind,
    },
}

impl Error {
    /// Returns the stream offset associated with this error, if any.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::MalformedSyntax { position, .. }
            | Self::EscapeSequence { position, .. }
            | Self::LiteralLength { position, .. }
            | Self::InvalidUtf8 { position }
            | Self::UnexpectedByte { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Returns true if this error came from the underlying reader.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns true if the stream simply ran out of bytes.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
