//! Raw field views and typed decoders.
//!
//! A [`Field`] is a sub-slice of its backing storage, exactly as it
//! appears on the wire: a quoted field still carries its enclosing quotes
//! and doubled escapes. Decoding is deferred until asked for, either
//! zero-copy through [`Field::write_decoded`] or as a [`Cow`] that only
//! allocates when an escaped quote has to be collapsed.

#[cfg(feature = "alloc")]
use alloc::borrow::Cow;
#[cfg(all(feature = "alloc", not(test)))]
use alloc::string::String;
#[cfg(all(feature = "alloc", not(test)))]
use alloc::vec::Vec;

use crate::error::CsvError;
#[cfg(feature = "alloc")]
use crate::error::DecodeError;
use crate::opts::CsvOpts;
use crate::stream::{ByteSink, DecodeSink};

/// A single raw field, borrowed from the parser's input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field<'a> {
    bytes: &'a [u8],
    opts: CsvOpts,
}

/// A field together with its row-end marker, as yielded by the slice
/// field iterator. `row_end` is true for the last field of a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowField<'a> {
    /// The raw field.
    pub field: Field<'a>,
    /// Whether the field's terminating separator ended the row.
    pub row_end: bool,
}

impl<'a> Field<'a> {
    pub fn new(bytes: &'a [u8], opts: CsvOpts) -> Self {
        Self { bytes, opts }
    }

    /// The raw bytes of the field, enclosing quotes included.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length of the raw field in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the raw field is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the field is quoted on the wire.
    #[inline]
    pub fn is_quoted(&self) -> bool {
        self.bytes.first() == Some(&self.opts.quote)
    }

    /// Stream the decoded bytes of the field into `sink` without
    /// allocating: quotes stripped, doubled quotes collapsed.
    pub fn write_decoded<S: ByteSink + ?Sized>(&self, sink: &mut S) -> Result<(), CsvError> {
        let mut decoder = DecodeSink::new(sink, self.opts.quote);
        decoder.write_all(self.bytes)
    }

    /// Decode the field. Borrows whenever possible; allocates only when a
    /// doubled quote has to be collapsed.
    #[cfg(feature = "alloc")]
    pub fn decode(&self) -> Cow<'a, [u8]> {
        if !self.is_quoted() {
            return Cow::Borrowed(self.bytes);
        }
        if self.bytes.len() < 2 {
            // A lone quote byte cannot appear in validated input.
            return Cow::Borrowed(&[]);
        }
        let inner = &self.bytes[1..self.bytes.len() - 1];
        if !inner.contains(&self.opts.quote) {
            return Cow::Borrowed(inner);
        }
        let mut out = Vec::with_capacity(inner.len());
        let mut i = 0;
        while i < inner.len() {
            out.push(inner[i]);
            if inner[i] == self.opts.quote {
                // Skip the second half of the doubled quote.
                i += 1;
            }
            i += 1;
        }
        Cow::Owned(out)
    }

    /// Decode the field into UTF-8 text.
    #[cfg(feature = "alloc")]
    pub fn to_str(&self) -> Result<Cow<'a, str>, DecodeError> {
        match self.decode() {
            Cow::Borrowed(b) => Ok(Cow::Borrowed(core::str::from_utf8(b)?)),
            Cow::Owned(v) => match String::from_utf8(v) {
                Ok(s) => Ok(Cow::Owned(s)),
                Err(e) => Err(DecodeError::Utf8(e.utf8_error())),
            },
        }
    }

    /// Parse the decoded field as a signed integer.
    #[cfg(feature = "alloc")]
    pub fn parse_i64(&self) -> Result<i64, DecodeError> {
        Ok(self.to_str()?.parse::<i64>()?)
    }

    /// Parse the decoded field as an unsigned integer.
    #[cfg(feature = "alloc")]
    pub fn parse_u64(&self) -> Result<u64, DecodeError> {
        Ok(self.to_str()?.parse::<u64>()?)
    }

    /// Parse the decoded field as a float.
    #[cfg(feature = "alloc")]
    pub fn parse_f64(&self) -> Result<f64, DecodeError> {
        Ok(self.to_str()?.parse::<f64>()?)
    }

    /// Parse the decoded field as a boolean. Accepts `yes`/`no` (the
    /// writer's forms) and `true`/`false`, case-insensitively.
    #[cfg(feature = "alloc")]
    pub fn parse_bool(&self) -> Result<bool, DecodeError> {
        let decoded = self.decode();
        let v: &[u8] = &decoded;
        if v.eq_ignore_ascii_case(b"yes") || v.eq_ignore_ascii_case(b"true") {
            Ok(true)
        } else if v.eq_ignore_ascii_case(b"no") || v.eq_ignore_ascii_case(b"false") {
            Ok(false)
        } else {
            Err(DecodeError::InvalidBool)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(bytes: &[u8]) -> Field<'_> {
        Field::new(bytes, CsvOpts::default())
    }

    #[test]
    fn test_unquoted_decode_borrows() {
        let f = field(b"plain");
        assert!(matches!(f.decode(), Cow::Borrowed(b"plain")));
    }

    #[test]
    fn test_quoted_decode_borrows_inner() {
        let f = field(b"\"Smith, Jack\"");
        assert!(matches!(f.decode(), Cow::Borrowed(b"Smith, Jack")));
    }

    #[test]
    fn test_escaped_decode_allocates() {
        let f = field(b"\"John \"\"Johnny\"\" Doe\"");
        assert_eq!(&*f.decode(), b"John \"Johnny\" Doe");
        let f = field(b"\"def\"\"geh\"");
        assert_eq!(&*f.decode(), b"def\"geh");
    }

    #[test]
    fn test_empty_quoted_field() {
        assert_eq!(&*field(b"\"\"").decode(), b"");
        assert_eq!(&*field(b"").decode(), b"");
    }

    #[test]
    fn test_write_decoded_matches_decode() {
        let f = field(b"\"a\"\"b\"");
        let mut out = Vec::new();
        f.write_decoded(&mut out).unwrap();
        assert_eq!(out, &*f.decode());
    }

    #[test]
    fn test_typed_parsers() {
        assert_eq!(field(b"42").parse_i64().unwrap(), 42);
        assert_eq!(field(b"-7").parse_i64().unwrap(), -7);
        assert_eq!(field(b"42").parse_u64().unwrap(), 42);
        assert_eq!(field(b"1.5").parse_f64().unwrap(), 1.5);
        assert_eq!(field(b"\"32\"").parse_i64().unwrap(), 32);
        assert!(field(b"4x").parse_i64().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(field(b"yes").parse_bool().unwrap());
        assert!(field(b"TRUE").parse_bool().unwrap());
        assert!(!field(b"no").parse_bool().unwrap());
        assert!(!field(b"False").parse_bool().unwrap());
        assert!(matches!(
            field(b"maybe").parse_bool(),
            Err(DecodeError::InvalidBool)
        ));
    }

    #[test]
    fn test_to_str_rejects_invalid_utf8() {
        assert!(field(&[0xFF, 0xFE]).to_str().is_err());
    }
}
