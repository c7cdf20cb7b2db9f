//! Row and value emission.
//!
//! [`write_row`] emits one CSV record from anything implementing
//! [`EncodeRow`]: a tuple of mixed [`Encode`] values, a slice or an
//! array. Values encode by semantic category — numbers in decimal text,
//! booleans as `yes`/`no`, byte sequences always quoted with embedded
//! quotes doubled, optional values by their payload or nothing at all.
//!
//! Custom enums pick their own category by implementing [`Encode`]:
//!
//! ```
//! use csvbits::{write_row, ByteSink, CsvError, CsvOpts, Encode};
//!
//! enum Status {
//!     Active,
//!     Retired { year: u16 },
//! }
//!
//! impl Encode for Status {
//!     fn encode<S: ByteSink + ?Sized>(
//!         &self,
//!         sink: &mut S,
//!         opts: &CsvOpts,
//!     ) -> Result<(), CsvError> {
//!         match self {
//!             // A plain tag emits its symbolic name, unquoted.
//!             Status::Active => sink.write_all(b"Active"),
//!             // A tagged variant emits its payload, not the tag.
//!             Status::Retired { year } => year.encode(sink, opts),
//!         }
//!     }
//! }
//!
//! let mut out = Vec::new();
//! write_row(&mut out, &(1u32, Status::Active), &CsvOpts::default()).unwrap();
//! assert_eq!(out, b"1,Active\r\n");
//! ```

#[cfg(all(feature = "alloc", not(test)))]
use alloc::string::String;
#[cfg(all(feature = "alloc", not(test)))]
use alloc::vec::Vec;

use core::fmt::{self, Debug, Display, Write as _};
use core::marker::PhantomData;

use crate::error::CsvError;
use crate::opts::CsvOpts;
use crate::stream::ByteSink;

/// A value that can be encoded as one CSV field.
pub trait Encode {
    /// Encode `self` into `sink` under `opts`.
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError>;
}

/// A value that can be encoded as one CSV record (without line ending).
pub trait EncodeRow {
    /// Encode the record's fields, separated by the delimiter.
    fn encode_row<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        opts: &CsvOpts,
    ) -> Result<(), CsvError>;
}

/// Emit one record followed by the configured line ending.
pub fn write_row<S, R>(sink: &mut S, row: &R, opts: &CsvOpts) -> Result<(), CsvError>
where
    S: ByteSink + ?Sized,
    R: EncodeRow + ?Sized,
{
    row.encode_row(sink, opts)?;
    write_line_end(sink, opts)
}

/// Emit one record of strings, every field quoted, followed by the
/// configured line ending.
pub fn write_row_str<S: ByteSink + ?Sized>(
    sink: &mut S,
    fields: &[&str],
    opts: &CsvOpts,
) -> Result<(), CsvError> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            sink.write_all(core::slice::from_ref(&opts.delimiter))?;
        }
        write_quoted(sink, field.as_bytes(), opts.quote)?;
    }
    write_line_end(sink, opts)
}

fn write_line_end<S: ByteSink + ?Sized>(sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
    if let Some(prefix) = opts.line_end_prefix {
        sink.write_all(core::slice::from_ref(&prefix))?;
    }
    sink.write_all(core::slice::from_ref(&opts.line_end))
}

/// Write `bytes` wrapped in quotes, doubling every embedded quote.
fn write_quoted<S: ByteSink + ?Sized>(
    sink: &mut S,
    bytes: &[u8],
    quote: u8,
) -> Result<(), CsvError> {
    let quote_slice = core::slice::from_ref(&quote);
    sink.write_all(quote_slice)?;
    let mut run = 0;
    for i in 0..bytes.len() {
        if bytes[i] == quote {
            // Flush up to and including the quote, then double it.
            sink.write_all(&bytes[run..=i])?;
            sink.write_all(quote_slice)?;
            run = i + 1;
        }
    }
    sink.write_all(&bytes[run..])?;
    sink.write_all(quote_slice)
}

/// Adapter feeding `core::fmt` output into a byte sink.
struct FmtSink<'a, S: ?Sized> {
    sink: &'a mut S,
    err: Option<CsvError>,
}

impl<S: ByteSink + ?Sized> fmt::Write for FmtSink<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.sink.write_all(s.as_bytes()).map_err(|e| {
            self.err = Some(e);
            fmt::Error
        })
    }
}

fn write_display<S: ByteSink + ?Sized>(sink: &mut S, value: impl Display) -> Result<(), CsvError> {
    let mut fmt_sink = FmtSink { sink, err: None };
    match write!(fmt_sink, "{value}") {
        Ok(()) => Ok(()),
        Err(_) => Err(fmt_sink.err.take().unwrap_or(CsvError::Sink)),
    }
}

fn write_debug<S: ByteSink + ?Sized>(sink: &mut S, value: impl Debug) -> Result<(), CsvError> {
    let mut fmt_sink = FmtSink { sink, err: None };
    match write!(fmt_sink, "{value:?}") {
        Ok(()) => Ok(()),
        Err(_) => Err(fmt_sink.err.take().unwrap_or(CsvError::Sink)),
    }
}

// =============================================================================
// Encode impls by semantic category
// =============================================================================

macro_rules! impl_encode_display {
    ($($t:ty)*) => {
        $(
            impl Encode for $t {
                #[inline]
                fn encode<S: ByteSink + ?Sized>(
                    &self,
                    sink: &mut S,
                    _opts: &CsvOpts,
                ) -> Result<(), CsvError> {
                    write_display(sink, self)
                }
            }
        )*
    };
}

impl_encode_display!(i8 i16 i32 i64 i128 isize u8 u16 u32 u64 u128 usize f32 f64);

impl Encode for bool {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, _opts: &CsvOpts) -> Result<(), CsvError> {
        sink.write_all(if *self { b"yes" } else { b"no" })
    }
}

impl Encode for str {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        write_quoted(sink, self.as_bytes(), opts.quote)
    }
}

impl Encode for [u8] {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        write_quoted(sink, self, opts.quote)
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        write_quoted(sink, self, opts.quote)
    }
}

#[cfg(feature = "alloc")]
impl Encode for String {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        write_quoted(sink, self.as_bytes(), opts.quote)
    }
}

#[cfg(feature = "alloc")]
impl Encode for Vec<u8> {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        write_quoted(sink, self, opts.quote)
    }
}

/// Optional: the payload when present, nothing when absent.
impl<T: Encode> Encode for Option<T> {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        match self {
            Some(value) => value.encode(sink, opts),
            None => Ok(()),
        }
    }
}

/// Fallible: the payload on success, the error's symbolic name unquoted
/// on failure.
impl<T: Encode, E: Debug> Encode for Result<T, E> {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        match self {
            Ok(value) => value.encode(sink, opts),
            Err(e) => write_debug(sink, e),
        }
    }
}

/// The null marker: emits nothing.
impl Encode for () {
    fn encode<S: ByteSink + ?Sized>(&self, _sink: &mut S, _opts: &CsvOpts) -> Result<(), CsvError> {
        Ok(())
    }
}

/// Type identity: emits the type's name, unquoted.
impl<T: ?Sized> Encode for PhantomData<T> {
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, _opts: &CsvOpts) -> Result<(), CsvError> {
        write_display(sink, core::any::type_name::<T>())
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    #[inline]
    fn encode<S: ByteSink + ?Sized>(&self, sink: &mut S, opts: &CsvOpts) -> Result<(), CsvError> {
        (**self).encode(sink, opts)
    }
}

// =============================================================================
// EncodeRow impls
// =============================================================================

impl<T: Encode> EncodeRow for [T] {
    fn encode_row<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        opts: &CsvOpts,
    ) -> Result<(), CsvError> {
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                sink.write_all(core::slice::from_ref(&opts.delimiter))?;
            }
            value.encode(sink, opts)?;
        }
        Ok(())
    }
}

impl<T: Encode, const N: usize> EncodeRow for [T; N] {
    fn encode_row<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        opts: &CsvOpts,
    ) -> Result<(), CsvError> {
        self.as_slice().encode_row(sink, opts)
    }
}

#[cfg(feature = "alloc")]
impl<T: Encode> EncodeRow for Vec<T> {
    fn encode_row<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        opts: &CsvOpts,
    ) -> Result<(), CsvError> {
        self.as_slice().encode_row(sink, opts)
    }
}

impl<R: EncodeRow + ?Sized> EncodeRow for &R {
    fn encode_row<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        opts: &CsvOpts,
    ) -> Result<(), CsvError> {
        (**self).encode_row(sink, opts)
    }
}

macro_rules! impl_encode_row_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Encode),+> EncodeRow for ($($name,)+) {
            fn encode_row<S: ByteSink + ?Sized>(
                &self,
                sink: &mut S,
                opts: &CsvOpts,
            ) -> Result<(), CsvError> {
                let mut first = true;
                $(
                    if !first {
                        sink.write_all(core::slice::from_ref(&opts.delimiter))?;
                    }
                    first = false;
                    self.$idx.encode(sink, opts)?;
                )+
                let _ = first;
                Ok(())
            }
        }
    };
}

impl_encode_row_tuple!(A.0);
impl_encode_row_tuple!(A.0, B.1);
impl_encode_row_tuple!(A.0, B.1, C.2);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4, F.5);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10);
impl_encode_row_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10, L.11);

#[cfg(test)]
mod tests {
    use super::*;

    fn render<R: EncodeRow>(row: &R) -> Vec<u8> {
        let mut out = Vec::new();
        write_row(&mut out, row, &CsvOpts::default()).unwrap();
        out
    }

    #[test]
    fn test_mixed_tuple_row() {
        let out = render(&(1i32, "he said \"hi\"", (), true));
        assert_eq!(out, b"1,\"he said \"\"hi\"\"\",,yes\r\n");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(render(&(-5i64, 7u8, 1.5f64, 2.0f32)), b"-5,7,1.5,2\r\n");
    }

    #[test]
    fn test_bools() {
        assert_eq!(render(&(true, false)), b"yes,no\r\n");
    }

    #[test]
    fn test_strings_always_quoted() {
        assert_eq!(render(&("plain",)), b"\"plain\"\r\n");
        assert_eq!(render(&(String::from("s"),)), b"\"s\"\r\n");
        assert_eq!(render(&(&b"ab"[..],)), b"\"ab\"\r\n");
        assert_eq!(render(&(*b"cd",)), b"\"cd\"\r\n");
        assert_eq!(render(&(b"e\"f".to_vec(),)), b"\"e\"\"f\"\r\n");
    }

    #[test]
    fn test_option_and_unit() {
        assert_eq!(render(&(Some(3i32), None::<i32>, ())), b"3,,\r\n");
        assert_eq!(render(&(None::<&str>,)), b"\r\n");
    }

    #[test]
    fn test_result_encodes_error_name() {
        #[derive(Debug)]
        enum Failure {
            Timeout,
        }
        let ok: Result<i32, Failure> = Ok(9);
        let err: Result<i32, Failure> = Err(Failure::Timeout);
        assert_eq!(render(&(ok, err)), b"9,Timeout\r\n");
    }

    #[test]
    fn test_type_name() {
        let out = render(&(PhantomData::<u32>,));
        assert_eq!(out, b"u32\r\n");
    }

    #[test]
    fn test_slice_and_array_rows() {
        let mut out = Vec::new();
        write_row(&mut out, &[1i32, 2, 3][..], &CsvOpts::default()).unwrap();
        assert_eq!(out, b"1,2,3\r\n");

        let mut out = Vec::new();
        write_row(&mut out, &["a", "b"], &CsvOpts::default()).unwrap();
        assert_eq!(out, b"\"a\",\"b\"\r\n");
    }

    #[test]
    fn test_write_row_str() {
        let mut out = Vec::new();
        write_row_str(&mut out, &["x", "y\"z"], &CsvOpts::default()).unwrap();
        assert_eq!(out, b"\"x\",\"y\"\"z\"\r\n");
    }

    #[test]
    fn test_lf_only_line_ending() {
        let opts = CsvOpts::default().with_line_end_prefix(None);
        let mut out = Vec::new();
        write_row(&mut out, &(1u8, 2u8), &opts).unwrap();
        assert_eq!(out, b"1,2\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut out = Vec::new();
        write_row(&mut out, &(1u8, "a"), &CsvOpts::tsv()).unwrap();
        assert_eq!(out, b"1\t\"a\"\r\n");
    }

    #[test]
    fn test_quote_doubling_with_custom_quote() {
        let opts = CsvOpts::default().with_quote(b'\'');
        let mut out = Vec::new();
        write_row(&mut out, &("it's",), &opts).unwrap();
        assert_eq!(out, b"'it''s'\r\n");
    }
}
