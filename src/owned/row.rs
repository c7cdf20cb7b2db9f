//! Owned, decoded rows.

#[cfg(not(test))]
use alloc::vec::Vec;

use crate::error::CsvError;
use crate::opts::CsvOpts;
use crate::stream::{ByteSource, DecodeSink, StreamFields};

/// One row, decoded and owned: a contiguous byte buffer holding every
/// field's decoded bytes plus an ordered table of `(offset, len)` spans.
///
/// Offsets are `u32`, capping a single row at 4 GB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedRow {
    buf: Vec<u8>,
    bounds: Vec<(u32, u32)>,
}

impl OwnedRow {
    /// Number of fields in the row.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether the row has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// The decoded bytes of field `idx` (0-indexed).
    pub fn field(&self, idx: usize) -> Option<&[u8]> {
        self.bounds.get(idx).map(|&span| self.slice(span))
    }

    /// Iterate the decoded fields in order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.bounds.iter().map(move |&span| self.slice(span))
    }

    pub(crate) fn spans(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.bounds.iter().copied()
    }

    pub(crate) fn slice(&self, (off, len): (u32, u32)) -> &[u8] {
        &self.buf[off as usize..(off + len) as usize]
    }
}

/// The allocating row adapter: parses one owned, decoded row per `next`.
///
/// Row buffers are pre-sized to the running maximum of previously seen
/// rows, so steady-state parsing settles into one allocation per row.
/// Structural errors are latched on the underlying streaming parser; the
/// partially built row is dropped.
#[derive(Debug)]
pub struct RowReader<R> {
    fields: StreamFields<R>,
    quote: u8,
    max_buf: usize,
    max_fields: usize,
}

impl<R: ByteSource> RowReader<R> {
    /// Create a row reader over `src`.
    pub fn new(src: R, opts: CsvOpts) -> Self {
        Self {
            fields: StreamFields::new(src, opts),
            quote: opts.quote,
            max_buf: 0,
            max_fields: 0,
        }
    }

    /// True once the input is exhausted or an error has been latched.
    pub fn done(&self) -> bool {
        self.fields.done()
    }

    /// The latched error, if any.
    pub fn err(&self) -> Option<&CsvError> {
        self.fields.err()
    }

    /// Take the latched error, if any.
    pub fn take_err(&mut self) -> Option<CsvError> {
        self.fields.take_err()
    }

    fn read_row(&mut self) -> Option<OwnedRow> {
        if self.fields.done() {
            return None;
        }
        let mut buf = Vec::with_capacity(self.max_buf);
        let mut bounds = Vec::with_capacity(self.max_fields);

        loop {
            let start = buf.len();
            let produced = {
                let mut decoder = DecodeSink::new(&mut buf, self.quote);
                self.fields.next(&mut decoder)
            };
            match produced {
                Ok(true) => {
                    bounds.push((start as u32, (buf.len() - start) as u32));
                    if self.fields.at_row_end() {
                        break;
                    }
                }
                Ok(false) => {
                    // Exhaustion, or a latched error discarding the row.
                    if self.fields.err().is_some() || bounds.is_empty() {
                        return None;
                    }
                    break;
                }
                Err(_) => return None,
            }
        }

        self.max_buf = self.max_buf.max(buf.len());
        self.max_fields = self.max_fields.max(bounds.len());
        Some(OwnedRow { buf, bounds })
    }
}

impl<R: ByteSource> Iterator for RowReader<R> {
    type Item = OwnedRow;

    fn next(&mut self) -> Option<OwnedRow> {
        self.read_row()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SliceSource;

    fn reader(input: &[u8]) -> RowReader<SliceSource<'_>> {
        RowReader::new(SliceSource::new(input), CsvOpts::default())
    }

    fn collect_rows(input: &[u8]) -> Vec<Vec<Vec<u8>>> {
        reader(input)
            .map(|row| row.iter().map(<[u8]>::to_vec).collect())
            .collect()
    }

    #[test]
    fn test_rows_are_decoded() {
        let rows = collect_rows(b"a,\"b,c\"\n\"d\"\"e\",f\n");
        assert_eq!(
            rows,
            vec![
                vec![b"a".to_vec(), b"b,c".to_vec()],
                vec![b"d\"e".to_vec(), b"f".to_vec()],
            ]
        );
    }

    #[test]
    fn test_field_access() {
        let mut rows = reader(b"x,y,z\n");
        let row = rows.next().unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.field(0), Some(&b"x"[..]));
        assert_eq!(row.field(2), Some(&b"z"[..]));
        assert_eq!(row.field(3), None);
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(collect_rows(b"").is_empty());
    }

    #[test]
    fn test_trailing_delimiter_final_empty_field() {
        let rows = collect_rows(b"a,b,\n");
        assert_eq!(
            rows,
            vec![vec![b"a".to_vec(), b"b".to_vec(), Vec::new()]]
        );
    }

    #[test]
    fn test_rows_without_trailing_newline() {
        let rows = collect_rows(b"a,b\nc,d");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![b"c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn test_error_discards_partial_row() {
        // Valid rows fill the first 64-byte window; the offending quote
        // sits in the second, so the earlier rows are delivered first.
        let mut input = Vec::new();
        for _ in 0..8 {
            input.extend_from_slice(b"aaa,bbb\n");
        }
        input.extend_from_slice(b"bad\"row\n");
        let mut rows = RowReader::new(SliceSource::new(&input), CsvOpts::default());
        for _ in 0..8 {
            assert!(rows.next().is_some());
        }
        assert!(rows.next().is_none());
        assert!(matches!(rows.err(), Some(CsvError::UnexpectedQuote)));
        assert!(rows.next().is_none(), "latched");
    }

    #[test]
    fn test_row_spanning_chunks() {
        let mut input = Vec::new();
        input.extend_from_slice(b"head\n\"");
        input.extend_from_slice(&[b'q'; 100]);
        input.extend_from_slice(b"\",tail\n");
        let rows = collect_rows(&input);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], vec![b'q'; 100]);
        assert_eq!(rows[1][1], b"tail".to_vec());
    }
}
