//! The decoding sink wrapper.

use crate::error::CsvError;
use crate::stream::ByteSink;

/// A filter sink that turns raw field bytes into decoded ones: the
/// enclosing quotes are stripped and doubled quotes collapse to one.
/// Unquoted fields pass through verbatim.
///
/// The decoder holds three bits of state and no buffer, so a field may be
/// written across any number of `write_all` calls — the streaming parser
/// does exactly that for fields spanning chunk boundaries. Call
/// [`field_end`](DecodeSink::field_end) between fields when reusing one
/// decoder for several of them.
#[derive(Debug)]
pub struct DecodeSink<'a, S: ?Sized> {
    inner: &'a mut S,
    quote: u8,
    started: bool,
    quoted: bool,
    last_was_quote: bool,
}

impl<'a, S: ByteSink + ?Sized> DecodeSink<'a, S> {
    /// Wrap `inner`, decoding against `quote`.
    pub fn new(inner: &'a mut S, quote: u8) -> Self {
        Self {
            inner,
            quote,
            started: false,
            quoted: false,
            last_was_quote: false,
        }
    }

    /// Reset for the next field. A pending quote at this point was the
    /// field's closing quote and is dropped.
    pub fn field_end(&mut self) {
        self.started = false;
        self.quoted = false;
        self.last_was_quote = false;
    }
}

impl<S: ByteSink + ?Sized> ByteSink for DecodeSink<'_, S> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), CsvError> {
        let mut bytes = bytes;
        if bytes.is_empty() {
            return Ok(());
        }
        if !self.started {
            self.started = true;
            if bytes[0] == self.quote {
                self.quoted = true;
                bytes = &bytes[1..];
            }
        }
        if !self.quoted {
            return self.inner.write_all(bytes);
        }

        // Quoted mode: emit maximal runs between quote bytes. A quote is
        // held pending until the next byte decides whether it was half of
        // an escaped pair or the closing quote.
        let mut run = 0;
        let mut i = 0;
        while i < bytes.len() {
            let is_quote = bytes[i] == self.quote;
            if self.last_was_quote {
                self.last_was_quote = false;
                if is_quote {
                    // Escaped pair; the second quote is literal.
                    run = i;
                    i += 1;
                    continue;
                }
                // The pending quote closed the field. Validated input has
                // nothing after it; pass any tail through untouched.
                self.quoted = false;
                return self.inner.write_all(&bytes[i..]);
            }
            if is_quote {
                self.inner.write_all(&bytes[run..i])?;
                self.last_was_quote = true;
                run = i + 1;
            }
            i += 1;
        }
        if !self.last_was_quote && run < bytes.len() {
            self.inner.write_all(&bytes[run..])?;
        }
        Ok(())
    }
}
