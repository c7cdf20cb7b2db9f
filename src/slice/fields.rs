//! Field-at-a-time iteration over a byte slice.

use crate::chunk::{scan_chunk, Carry};
use crate::error::CsvError;
use crate::field::{Field, RowField};
use crate::opts::CsvOpts;
use crate::CHUNK_LEN;

/// A zero-allocation field iterator over an in-memory byte slice.
///
/// Each item is a [`RowField`]: a raw sub-slice of the input plus a flag
/// marking the last field of its row. The iterator allocates nothing and
/// never copies field bytes.
///
/// Structural errors are latched: iteration stops and the error stays
/// available through [`err`](Fields::err) / [`take_err`](Fields::take_err).
/// Validation runs a whole 64-byte window at a time, so an error anywhere
/// in a window suppresses that window's fields.
///
/// # Example
///
/// ```
/// use csvbits::{CsvOpts, Fields};
///
/// let mut fields = Fields::new(b"a,b\n1,2\n", CsvOpts::default());
/// let first = fields.next().unwrap();
/// assert_eq!(first.field.bytes(), b"a");
/// assert!(!first.row_end);
/// let second = fields.next().unwrap();
/// assert_eq!(second.field.bytes(), b"b");
/// assert!(second.row_end);
/// ```
#[derive(Debug)]
pub struct Fields<'a> {
    input: &'a [u8],
    opts: CsvOpts,
    /// Absolute offset where the next field begins.
    start: usize,
    /// Index of the chunk whose separator mask is loaded.
    chunk: usize,
    /// Unconsumed separator bits of that chunk.
    seps: u64,
    carry: Carry,
    /// A field has started and awaits its terminating separator. Starts
    /// true so that empty input still yields its one empty field.
    field_start: bool,
    need_init: bool,
    at_end: bool,
    err: Option<CsvError>,
}

impl<'a> Fields<'a> {
    /// Create a field iterator over `input`.
    pub fn new(input: &'a [u8], opts: CsvOpts) -> Self {
        let err = if opts.valid() {
            None
        } else {
            Some(CsvError::InvalidOptions)
        };
        Self {
            input,
            opts,
            start: 0,
            chunk: 0,
            seps: 0,
            carry: Carry::new(),
            field_start: true,
            need_init: true,
            at_end: false,
            err,
        }
    }

    /// The absolute byte offset where the next field begins.
    #[inline]
    pub fn start_pos(&self) -> usize {
        self.start
    }

    /// True once the input is exhausted or an error has been latched.
    pub fn done(&self) -> bool {
        self.err.is_some()
            || self.at_end
            || (self.scanned_last()
                && self.start >= self.input.len()
                && !self.field_start)
    }

    /// The final chunk (the one holding the implicit terminator) has been
    /// scanned, so every carried validation has run.
    fn scanned_last(&self) -> bool {
        !self.need_init && self.chunk >= self.input.len() / CHUNK_LEN
    }

    /// The latched error, if any.
    pub fn err(&self) -> Option<&CsvError> {
        self.err.as_ref()
    }

    /// Take the latched error, if any.
    pub fn take_err(&mut self) -> Option<CsvError> {
        self.err.take()
    }

    pub(crate) fn input(&self) -> &'a [u8] {
        self.input
    }

    pub(crate) fn opts(&self) -> CsvOpts {
        self.opts
    }

    fn latch(&mut self, e: CsvError) {
        self.err = Some(e);
        self.at_end = true;
    }

    fn load(&mut self, idx: usize) -> Result<u64, CsvError> {
        let lo = idx * CHUNK_LEN;
        let hi = self.input.len().min(lo + CHUNK_LEN);
        scan_chunk(&self.input[lo..hi], &mut self.carry, &self.opts)
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = RowField<'a>;

    fn next(&mut self) -> Option<RowField<'a>> {
        if self.done() {
            return None;
        }
        if self.need_init {
            self.need_init = false;
            match self.load(0) {
                Ok(mask) => self.seps = mask,
                Err(e) => {
                    self.latch(e);
                    return None;
                }
            }
        }

        // The final chunk is the one holding the implicit terminator.
        let last_chunk = self.input.len() / CHUNK_LEN;
        let mut iters = 0usize;
        loop {
            if self.seps != 0 {
                let k = self.seps.trailing_zeros() as usize;
                let abs = self.chunk * CHUNK_LEN + k;
                if abs >= self.input.len() && !self.field_start {
                    // The implicit terminator with no field pending.
                    self.at_end = true;
                    return None;
                }
                self.seps &= self.seps - 1;

                let end = abs.min(self.input.len());
                let bytes = &self.input[self.start.min(end)..end];

                let mut advance = 1;
                let row_end = if abs >= self.input.len() {
                    true
                } else {
                    let b = self.input[abs];
                    if b == self.opts.delimiter {
                        false
                    } else {
                        if Some(b) == self.opts.line_end_prefix {
                            // Swallow the LF half of the pair. A pair whose
                            // LF falls in the next chunk was already cleared
                            // by the carry.
                            if k < CHUNK_LEN - 1 {
                                self.seps &= !(1u64 << (k + 1));
                            }
                            advance = 2;
                        }
                        true
                    }
                };
                self.field_start = !row_end;
                self.start = abs + advance;
                return Some(RowField {
                    field: Field::new(bytes, self.opts),
                    row_end,
                });
            }

            if self.chunk >= last_chunk {
                self.at_end = true;
                return None;
            }
            self.chunk += 1;
            iters += 1;
            if iters > self.opts.max_iter {
                self.latch(CsvError::InternalLimitReached);
                return None;
            }
            match self.load(self.chunk) {
                Ok(mask) => self.seps = mask,
                Err(e) => {
                    self.latch(e);
                    return None;
                }
            }
        }
    }
}
