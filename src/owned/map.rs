//! Header-keyed row maps.
//!
//! Two key-sharing modes with the lifetime-versus-allocation trade made
//! explicit in the types:
//!
//! - [`MapRow`] borrows its keys from the header owned by the
//!   [`HeaderReader`]; the borrow checker enforces that the reader
//!   outlives every row.
//! - [`OwnedMapRow`] owns a private clone of each key and is independent
//!   of the reader's lifetime.
//!
//! Duplicate header keys are allowed; later columns overwrite earlier
//! ones in the map, while positional access through the underlying row
//! still sees every column.

use indexmap::IndexMap;

#[cfg(not(test))]
use alloc::vec::Vec;

use crate::error::CsvError;
use crate::opts::CsvOpts;
use crate::owned::{OwnedRow, RowReader};
use crate::stream::ByteSource;

/// A row reader that parses the first row as a header and rekeys every
/// data row by it.
#[derive(Debug)]
pub struct HeaderReader<R> {
    rows: RowReader<R>,
    header: OwnedRow,
    err: Option<CsvError>,
}

impl<R: ByteSource> HeaderReader<R> {
    /// Create a header reader over `src`, eagerly parsing the header row.
    /// Fails with [`CsvError::NoHeaderRow`] when the input is empty.
    pub fn new(src: R, opts: CsvOpts) -> Result<Self, CsvError> {
        let mut rows = RowReader::new(src, opts);
        match rows.next() {
            Some(header) => Ok(Self {
                rows,
                header,
                err: None,
            }),
            None => Err(rows.take_err().unwrap_or(CsvError::NoHeaderRow)),
        }
    }

    /// The parsed header row.
    pub fn header(&self) -> &OwnedRow {
        &self.header
    }

    /// Split the reader into the header and the underlying row reader,
    /// for callers that want several [`MapRow`]s alive at once.
    pub fn parts_mut(&mut self) -> (&OwnedRow, &mut RowReader<R>) {
        (&self.header, &mut self.rows)
    }

    /// True once the input is exhausted or an error has been latched.
    pub fn done(&self) -> bool {
        self.err.is_some() || self.rows.done()
    }

    /// The latched error, if any.
    pub fn err(&self) -> Option<&CsvError> {
        self.err.as_ref().or_else(|| self.rows.err())
    }

    /// Take the latched error, if any.
    pub fn take_err(&mut self) -> Option<CsvError> {
        self.err.take().or_else(|| self.rows.take_err())
    }

    /// Parse the next data row and rekey it with keys borrowed from this
    /// reader's header.
    pub fn next_map(&mut self) -> Option<MapRow<'_>> {
        let row = self.next_checked_row()?;
        MapRow::build(&self.header, row).ok()
    }

    /// Parse the next data row and rekey it with keys it owns itself.
    pub fn next_owned(&mut self) -> Option<OwnedMapRow> {
        let row = self.next_checked_row()?;
        OwnedMapRow::build(&self.header, row).ok()
    }

    /// Next data row, with the width check done up front so both map
    /// builders are infallible afterwards.
    fn next_checked_row(&mut self) -> Option<OwnedRow> {
        if self.err.is_some() {
            return None;
        }
        let row = self.rows.next()?;
        if row.len() > self.header.len() {
            self.err = Some(CsvError::NoHeaderForColumn);
            return None;
        }
        Some(row)
    }
}

/// A decoded row rekeyed by header fields borrowed from the reader.
#[derive(Debug)]
pub struct MapRow<'h> {
    row: OwnedRow,
    map: IndexMap<&'h [u8], (u32, u32)>,
}

impl<'h> MapRow<'h> {
    /// Build a map row from a header and a data row. Fails with
    /// [`CsvError::NoHeaderForColumn`] when the row is wider than the
    /// header.
    pub fn build(header: &'h OwnedRow, row: OwnedRow) -> Result<Self, CsvError> {
        let mut map = IndexMap::with_capacity(header.len());
        for (i, span) in row.spans().enumerate() {
            match header.field(i) {
                Some(key) => {
                    map.insert(key, span);
                }
                None => return Err(CsvError::NoHeaderForColumn),
            }
        }
        Ok(Self { row, map })
    }

    /// The decoded field under `key`, if the header has that column.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.map.get(key).map(|&span| self.row.slice(span))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The keys in header order.
    pub fn keys(&self) -> impl Iterator<Item = &'h [u8]> + '_ {
        self.map.keys().copied()
    }

    /// The underlying row, for positional access.
    pub fn row(&self) -> &OwnedRow {
        &self.row
    }
}

/// A decoded row rekeyed by header fields it owns itself. The owned keys
/// are the per-row clone of the header.
#[derive(Debug)]
pub struct OwnedMapRow {
    row: OwnedRow,
    map: IndexMap<Vec<u8>, (u32, u32)>,
}

impl OwnedMapRow {
    /// Build an owned map row from a header and a data row. Fails with
    /// [`CsvError::NoHeaderForColumn`] when the row is wider than the
    /// header.
    pub fn build(header: &OwnedRow, row: OwnedRow) -> Result<Self, CsvError> {
        let mut map = IndexMap::with_capacity(header.len());
        for (i, span) in row.spans().enumerate() {
            match header.field(i) {
                Some(key) => {
                    map.insert(key.to_vec(), span);
                }
                None => return Err(CsvError::NoHeaderForColumn),
            }
        }
        Ok(Self { row, map })
    }

    /// The decoded field under `key`, if the header has that column.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.map.get(key).map(|&span| self.row.slice(span))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The keys in header order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.map.keys().map(Vec::as_slice)
    }

    /// The underlying row, for positional access.
    pub fn row(&self) -> &OwnedRow {
        &self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SliceSource;

    fn reader(input: &[u8]) -> HeaderReader<SliceSource<'_>> {
        HeaderReader::new(SliceSource::new(input), CsvOpts::default()).unwrap()
    }

    #[test]
    fn test_shared_key_rows() {
        let mut hdr = reader(b"userid,name,age\n1,\"Smith, Jack\",53\n");
        assert_eq!(hdr.header().len(), 3);

        let row = hdr.next_map().unwrap();
        assert_eq!(row.get(b"userid"), Some(&b"1"[..]));
        assert_eq!(row.get(b"name"), Some(&b"Smith, Jack"[..]));
        assert_eq!(row.get(b"age"), Some(&b"53"[..]));
        assert_eq!(row.get(b"missing"), None);
        drop(row);
        assert!(hdr.next_map().is_none());
        assert!(hdr.err().is_none());
    }

    #[test]
    fn test_owned_key_rows_outlive_reader() {
        let rows: Vec<OwnedMapRow> = {
            let mut hdr = reader(b"k,v\na,1\nb,2\n");
            let mut out = Vec::new();
            while let Some(row) = hdr.next_owned() {
                out.push(row);
            }
            out
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(b"k"), Some(&b"a"[..]));
        assert_eq!(rows[1].get(b"v"), Some(&b"2"[..]));
    }

    #[test]
    fn test_several_shared_rows_alive_via_parts() {
        let mut hdr = reader(b"k,v\na,1\nb,2\n");
        let (header, rows) = hdr.parts_mut();
        let first = MapRow::build(header, rows.next().unwrap()).unwrap();
        let second = MapRow::build(header, rows.next().unwrap()).unwrap();
        assert_eq!(first.get(b"k"), Some(&b"a"[..]));
        assert_eq!(second.get(b"k"), Some(&b"b"[..]));
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let res = HeaderReader::new(SliceSource::new(b""), CsvOpts::default());
        assert!(matches!(res, Err(CsvError::NoHeaderRow)));
    }

    #[test]
    fn test_row_wider_than_header() {
        let mut hdr = reader(b"a,b\n1,2,3\n");
        assert!(hdr.next_map().is_none());
        assert!(matches!(hdr.err(), Some(CsvError::NoHeaderForColumn)));
        assert!(hdr.done());
    }

    #[test]
    fn test_row_narrower_than_header_is_fine() {
        let mut hdr = reader(b"a,b,c\n1,2\n");
        let row = hdr.next_map().unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get(b"a"), Some(&b"1"[..]));
        assert_eq!(row.get(b"c"), None);
    }

    #[test]
    fn test_duplicate_keys_later_column_wins() {
        let mut hdr = reader(b"x,x,y\n1,2,3\n");
        let row = hdr.next_map().unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get(b"x"), Some(&b"2"[..]), "later column overwrites");
        assert_eq!(row.get(b"y"), Some(&b"3"[..]));
        // Positional access still sees every column.
        assert_eq!(row.row().field(0), Some(&b"1"[..]));
    }

    #[test]
    fn test_decoded_header_keys() {
        let mut hdr = reader(b"\"user id\",\"a\"\"b\"\nu1,v1\n");
        let row = hdr.next_map().unwrap();
        assert_eq!(row.get(b"user id"), Some(&b"u1"[..]));
        assert_eq!(row.get(b"a\"b"), Some(&b"v1"[..]));
    }
}
