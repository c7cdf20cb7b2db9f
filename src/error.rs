//! Error types.
//!
//! Structural parse errors are *latched*: the offending `next` call yields
//! nothing, every later call yields nothing, and the error stays on the
//! parser until read through `err()` or consumed through `take_err()`.
//! Sink failures are surfaced immediately as `Err` return values; the
//! parser is poisoned with [`CsvError::Sink`] because bytes of the current
//! field may already have been written. Per-field typed conversions use the
//! independent, non-latching [`DecodeError`].

use thiserror::Error;

/// Errors raised by the tokeniser, the allocating layer and the writer.
#[derive(Debug, Error)]
pub enum CsvError {
    /// A carriage return was not immediately followed by a line feed, or
    /// the input ended on a carriage return.
    #[error("carriage return not followed by a line feed")]
    InvalidLineEnding,

    /// The input ended inside a quoted field.
    #[error("input ended inside a quoted field")]
    UnexpectedEndOfFile,

    /// A closing quote was not followed by a delimiter, a line ending or
    /// the end of input.
    #[error("closing quote not followed by a field separator")]
    QuotePrematurelyTerminated,

    /// A quote appeared inside an unquoted field, or an opening quote was
    /// not at the start of a field.
    #[error("quote character inside an unquoted field")]
    UnexpectedQuote,

    /// The chunk-advance guard (`CsvOpts::max_iter`) was exceeded.
    #[error("chunk iteration limit exceeded")]
    InternalLimitReached,

    /// The configured delimiter, quote and line-ending bytes overlap.
    #[error("configured delimiter, quote and line-ending bytes overlap")]
    InvalidOptions,

    /// A header-map reader was constructed over empty input.
    #[error("input has no header row")]
    NoHeaderRow,

    /// A data row has more fields than the header row.
    #[error("row has more fields than the header")]
    NoHeaderForColumn,

    /// A byte sink failed earlier; the parser state was discarded.
    #[error("byte sink failed; parser state discarded")]
    Sink,

    /// An I/O error from a `std::io` source or sink adapter.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from the typed field decoders. Returned per call, never latched.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The decoded field is not valid UTF-8.
    #[error("field is not valid UTF-8")]
    Utf8(#[from] core::str::Utf8Error),

    /// The decoded field is not a valid integer.
    #[error("field is not a valid integer")]
    Int(#[from] core::num::ParseIntError),

    /// The decoded field is not a valid float.
    #[error("field is not a valid float")]
    Float(#[from] core::num::ParseFloatError),

    /// The decoded field is not a recognised boolean.
    #[error("field is not a recognised boolean")]
    InvalidBool,
}
