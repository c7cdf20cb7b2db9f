//! Allocating row and header-map layers.
//!
//! This is the only part of the crate that allocates: rows own a decoded
//! byte buffer, and the header-map adapters rekey those rows by a parsed
//! header. Everything here consumes the streaming field iterator.

mod row;

pub use row::{OwnedRow, RowReader};

#[cfg(feature = "std")]
mod map;

#[cfg(feature = "std")]
pub use map::{HeaderReader, MapRow, OwnedMapRow};
