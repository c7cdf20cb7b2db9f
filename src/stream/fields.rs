//! Field-at-a-time streaming over a pull-based byte source.

use crate::chunk::{scan_chunk, Carry};
use crate::error::CsvError;
use crate::opts::CsvOpts;
use crate::stream::{ByteSink, ByteSource};
use crate::CHUNK_LEN;

/// A streaming field iterator.
///
/// `next` writes the bytes of one field into the caller's sink and
/// reports through [`at_row_end`](StreamFields::at_row_end) whether that
/// field closed its row. Bytes arrive in the raw wire form; wrap the sink
/// in a [`DecodeSink`](crate::stream::DecodeSink) for decoded output.
///
/// Structural errors are latched: the offending call returns `Ok(false)`
/// and the error is retrievable through `err`/`take_err`. Sink failures
/// are returned immediately and poison the parser, since part of the
/// current field may already have been written.
///
/// The iterator keeps the chunk being consumed plus one prefetched chunk;
/// everything older lives on only in the carry masks.
#[derive(Debug)]
pub struct StreamFields<R> {
    src: R,
    opts: CsvOpts,
    cur: [u8; CHUNK_LEN],
    cur_len: usize,
    nxt: [u8; CHUNK_LEN],
    nxt_len: usize,
    src_done: bool,
    /// Unconsumed separator bits of `cur`.
    seps: u64,
    /// Offset of the current field's unwritten tail within `cur`. May
    /// exceed `cur_len` once the implicit terminator has been consumed.
    offset: usize,
    carry: Carry,
    /// A field has started and awaits its terminating separator.
    field_start: bool,
    row_end: bool,
    need_init: bool,
    at_end: bool,
    err: Option<CsvError>,
}

impl<R: ByteSource> StreamFields<R> {
    /// Create a streaming field iterator over `src`.
    pub fn new(src: R, opts: CsvOpts) -> Self {
        let err = if opts.valid() {
            None
        } else {
            Some(CsvError::InvalidOptions)
        };
        Self {
            src,
            opts,
            cur: [0; CHUNK_LEN],
            cur_len: 0,
            nxt: [0; CHUNK_LEN],
            nxt_len: 0,
            src_done: false,
            seps: 0,
            offset: 0,
            carry: Carry::new(),
            field_start: true,
            row_end: false,
            need_init: true,
            at_end: false,
            err,
        }
    }

    /// Whether the most recently produced field ended its row.
    #[inline]
    pub fn at_row_end(&self) -> bool {
        self.row_end
    }

    /// True once the input is exhausted or an error has been latched.
    pub fn done(&self) -> bool {
        self.err.is_some() || self.at_end || (!self.need_init && self.exhausted())
    }

    /// The latched error, if any.
    pub fn err(&self) -> Option<&CsvError> {
        self.err.as_ref()
    }

    /// Take the latched error, if any.
    pub fn take_err(&mut self) -> Option<CsvError> {
        self.err.take()
    }

    fn latch(&mut self, e: CsvError) {
        self.err = Some(e);
        self.at_end = true;
    }

    /// The final chunk has been scanned, its bytes are consumed, and no
    /// field is pending. The carries are settled at this point, so there
    /// is nothing left to validate either.
    fn exhausted(&self) -> bool {
        self.cur_len < CHUNK_LEN && self.offset >= self.cur_len && !self.field_start
    }

    fn init(&mut self) -> Result<(), CsvError> {
        self.need_init = false;
        self.cur_len = self.src.fill(&mut self.cur)?;
        if self.cur_len < CHUNK_LEN {
            self.src_done = true;
        } else {
            self.nxt_len = self.src.fill(&mut self.nxt)?;
            if self.nxt_len < CHUNK_LEN {
                self.src_done = true;
            }
        }
        self.seps = scan_chunk(&self.cur[..self.cur_len], &mut self.carry, &self.opts)?;
        if self.cur_len == 0 {
            // An empty stream is done before producing anything.
            self.field_start = false;
            self.at_end = true;
        }
        Ok(())
    }

    /// Shift the prefetched chunk in, refill the prefetch, and scan.
    fn rotate(&mut self) -> Result<(), CsvError> {
        self.cur = self.nxt;
        self.cur_len = self.nxt_len;
        // An offset past the old chunk skips the LF half of a CR/LF pair
        // that straddled the boundary.
        self.offset = self.offset.saturating_sub(CHUNK_LEN);
        if self.src_done || self.cur_len < CHUNK_LEN {
            self.nxt_len = 0;
            self.src_done = true;
        } else {
            self.nxt_len = self.src.fill(&mut self.nxt)?;
            if self.nxt_len < CHUNK_LEN {
                self.src_done = true;
            }
        }
        self.seps = scan_chunk(&self.cur[..self.cur_len], &mut self.carry, &self.opts)?;
        Ok(())
    }

    /// Write the next field into `sink`. Returns `Ok(true)` when a field
    /// was produced, `Ok(false)` on exhaustion or a latched error, and
    /// `Err` only for sink failures.
    pub fn next<S: ByteSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool, CsvError> {
        if self.err.is_some() || self.at_end {
            return Ok(false);
        }
        if self.need_init {
            if let Err(e) = self.init() {
                self.latch(e);
                return Ok(false);
            }
            if self.at_end {
                return Ok(false);
            }
        }
        if self.exhausted() {
            self.at_end = true;
            return Ok(false);
        }

        let mut iters = 0usize;
        loop {
            if self.seps != 0 {
                let k = self.seps.trailing_zeros() as usize;
                self.seps &= self.seps - 1;

                let end = k.min(self.cur_len);
                if self.offset < end {
                    if let Err(e) = sink.write_all(&self.cur[self.offset..end]) {
                        self.latch(CsvError::Sink);
                        return Err(e);
                    }
                }

                let mut advance = 1;
                let row_end = if k >= self.cur_len {
                    true
                } else {
                    let b = self.cur[k];
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
                self.offset = k + advance;
                self.row_end = row_end;
                self.field_start = !row_end;
                return Ok(true);
            }

            // No separator left in this chunk: the field continues. Flush
            // its tail and pull the next chunk in.
            if self.offset < self.cur_len {
                if let Err(e) = sink.write_all(&self.cur[self.offset..self.cur_len]) {
                    self.latch(CsvError::Sink);
                    return Err(e);
                }
                self.offset = self.cur_len;
            }
            if self.cur_len < CHUNK_LEN {
                // Final chunk with every separator consumed.
                self.at_end = true;
                return Ok(false);
            }

            iters += 1;
            if iters > self.opts.max_iter {
                self.latch(CsvError::InternalLimitReached);
                return Ok(false);
            }
            if let Err(e) = self.rotate() {
                self.latch(e);
                return Ok(false);
            }
            if self.exhausted() {
                self.at_end = true;
                return Ok(false);
            }
        }
    }
}
