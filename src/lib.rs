//! # csvbits
//!
//! CSV (RFC 4180 family) reading and writing built on a vectorised,
//! branch-lean tokeniser.
//!
//! The tokeniser works on fixed 64-byte chunks: per chunk it builds
//! bit-parallel match masks for the structural bytes, derives the
//! quoted-region mask with a prefix XOR, and reconstructs field and row
//! boundaries from the resulting separator mask. A small set of carry
//! bits threads quoting, CR/LF pairs and quote runs across chunk
//! boundaries, so arbitrary inputs parse identically however they are
//! chunked.
//!
//! ## Module Organization
//!
//! - [`slice`] - Zero-allocation field and row iterators over `&[u8]`
//! - [`stream`] - Pull-based streaming parser writing into caller sinks
//! - [`owned`] - Allocating rows and header-keyed maps (`alloc`/`std`)
//! - [`write`] - Type-driven row writer
//!
//! ## Quick Start
//!
//! ```
//! use csvbits::{CsvOpts, Rows};
//!
//! let input = b"userid,name\n1,\"Smith, Jack\"\n";
//! let mut rows = Rows::new(input, CsvOpts::default());
//!
//! let header = rows.next().unwrap();
//! assert_eq!(header.len(), 2);
//!
//! let row = rows.next().unwrap();
//! assert_eq!(&*row.get(1).unwrap().decode(), b"Smith, Jack");
//! assert!(rows.next().is_none());
//! ```
//!
//! ## Ownership of fields
//!
//! The three parsing layers expose the ownership contract in their types:
//! slice iterators return borrows of the input, the streaming parser
//! writes into a caller-supplied [`ByteSink`], and the allocating layer
//! returns rows that own their decoded bytes.
//!
//! ## Features
//!
//! - `std` (default) - `std::io` source/sink adapters and the header-map
//!   layer
//! - `alloc` - the allocating row layer and `Cow`-returning decoders
//! - `serde` - serialization for [`CsvOpts`]

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(all(feature = "alloc", not(any(test, feature = "std"))))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

// =============================================================================
// Core modules
// =============================================================================

/// The 64-byte chunk engine: match masks, quoted regions, carries.
pub(crate) mod chunk;

/// Error types.
pub mod error;

/// Raw field views and typed decoders.
pub mod field;

/// Configuration.
pub mod opts;

// =============================================================================
// Parsing and writing layers
// =============================================================================

/// Zero-allocation iterators over in-memory CSV.
pub mod slice;

/// Streaming, reader-driven parsing.
pub mod stream;

/// Allocating row and header-map layers.
#[cfg(feature = "alloc")]
pub mod owned;

/// Row and value emission.
pub mod write;

// =============================================================================
// Public re-exports (convenience)
// =============================================================================

pub use error::{CsvError, DecodeError};
pub use field::{Field, RowField};
pub use opts::CsvOpts;

pub use slice::{Fields, Row, Rows};
pub use stream::{ByteSink, ByteSource, DecodeSink, SliceSource, StreamFields};

#[cfg(feature = "std")]
pub use stream::{IoSink, IoSource};

#[cfg(feature = "alloc")]
pub use owned::{OwnedRow, RowReader};

#[cfg(feature = "std")]
pub use owned::{HeaderReader, MapRow, OwnedMapRow};

pub use write::{write_row, write_row_str, Encode, EncodeRow};

/// Width in bytes of the tokeniser's scan window.
pub const CHUNK_LEN: usize = 64;
