//! Streaming, reader-driven parsing.
//!
//! The streaming variant runs the same chunk algebra as the slice
//! iterators, but pulls its 64-byte windows from a [`ByteSource`] and
//! writes field bytes into a caller-supplied [`ByteSink`]. Wrap the sink
//! in a [`DecodeSink`] to receive unquoted, unescaped bytes instead of
//! the raw wire form.

mod decode;
mod fields;
mod io;

pub use decode::DecodeSink;
pub use fields::StreamFields;
pub use io::{ByteSink, ByteSource, SliceSource};

#[cfg(feature = "std")]
pub use io::{IoSink, IoSource};
