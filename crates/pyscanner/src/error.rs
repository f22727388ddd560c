use thiserror::Error;

/// Why a serialized scanner state could not be restored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The buffer is larger than the configured state capacity.
    #[error("state of {len} bytes exceeds the capacity of {capacity} bytes")]
    Oversized {
        /// Length of the rejected buffer.
        len: usize,
        /// Configured capacity.
        capacity: usize,
    },
    /// The delimiter count runs past the end of the buffer.
    #[error("state declares {declared} delimiters but only {available} bytes follow")]
    TruncatedDelimiters {
        /// Count stored in the first byte.
        declared: usize,
        /// Bytes remaining after the count.
        available: usize,
    },
    /// A delimiter byte has no terminator, several terminators, or unknown
    /// bits.
    #[error("invalid delimiter flags {bits:#04x} at position {index}")]
    InvalidDelimiter {
        /// Position in the delimiter stack, outermost first.
        index: usize,
        /// The offending byte.
        bits: u8,
    },
    /// An indentation level is cut off by the end of the buffer or does not
    /// fit in 32 bits.
    #[error("indentation level at depth {depth} is truncated or too large")]
    MalformedIndent {
        /// Position in the indentation stack, the top-level column being 0.
        depth: usize,
    },
    /// A full indentation stack does not start at the top-level column.
    #[error("indentation stack does not start at column 0")]
    MissingBaseIndent,
    /// The restored indentation levels do not strictly increase.
    #[error("indentation level {level} at depth {depth} does not exceed the level below it")]
    NonIncreasingIndent {
        /// Position in the indentation stack, the top-level column being 0.
        depth: usize,
        /// The offending level.
        level: u32,
    },
}
