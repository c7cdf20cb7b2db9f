//! Byte source and sink abstractions.

#[cfg(all(feature = "alloc", not(test)))]
use alloc::vec::Vec;

use crate::error::CsvError;
use crate::CHUNK_LEN;

/// A pull-based input for the streaming parser.
pub trait ByteSource {
    /// Fill `buf` from the input and return the number of bytes written.
    /// Returning fewer than [`CHUNK_LEN`] bytes signals end of input;
    /// any later call must return 0.
    fn fill(&mut self, buf: &mut [u8; CHUNK_LEN]) -> Result<usize, CsvError>;
}

/// A push-based output for the streaming parser and the writer.
pub trait ByteSink {
    /// Write all of `bytes` or fail.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), CsvError>;
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), CsvError> {
        (**self).write_all(bytes)
    }
}

#[cfg(feature = "alloc")]
impl ByteSink for Vec<u8> {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), CsvError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// A [`ByteSource`] over an in-memory slice, mostly useful for feeding
/// the streaming layer in tests and for the header-map adapters.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn fill(&mut self, buf: &mut [u8; CHUNK_LEN]) -> Result<usize, CsvError> {
        let rest = &self.data[self.pos..];
        let n = rest.len().min(CHUNK_LEN);
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// A [`ByteSource`] over any [`std::io::Read`].
///
/// Short reads are looped over so the fill contract holds even for
/// readers that hand out a few bytes at a time.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    eof: bool,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> IoSource<R> {
    /// Create a source over `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner, eof: false }
    }

    /// Unwrap the source, returning the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> ByteSource for IoSource<R> {
    fn fill(&mut self, buf: &mut [u8; CHUNK_LEN]) -> Result<usize, CsvError> {
        if self.eof {
            return Ok(0);
        }
        let mut n = 0;
        while n < buf.len() {
            match self.inner.read(&mut buf[n..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(m) => n += m,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(CsvError::Io(e)),
            }
        }
        Ok(n)
    }
}

/// A [`ByteSink`] over any [`std::io::Write`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
}

#[cfg(feature = "std")]
impl<W: std::io::Write> IoSink<W> {
    /// Create a sink over `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoSink<W> {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), CsvError> {
        self.inner.write_all(bytes).map_err(CsvError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_chunks() {
        let data = [7u8; 100];
        let mut src = SliceSource::new(&data);
        let mut buf = [0u8; CHUNK_LEN];

        assert_eq!(src.fill(&mut buf).unwrap(), 64);
        assert_eq!(src.fill(&mut buf).unwrap(), 36);
        assert_eq!(src.fill(&mut buf).unwrap(), 0);
    }

    /// A reader that returns at most a few bytes per call.
    struct Dribble<'a> {
        data: &'a [u8],
        pos: usize,
        step: usize,
    }

    impl std::io::Read for Dribble<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self
                .step
                .min(buf.len())
                .min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            self.step = self.step % 7 + 1;
            Ok(n)
        }
    }

    #[test]
    fn test_io_source_fills_whole_chunks() {
        let data: Vec<u8> = (0..200u8).collect();
        let mut src = IoSource::new(Dribble {
            data: &data,
            pos: 0,
            step: 3,
        });
        let mut buf = [0u8; CHUNK_LEN];

        assert_eq!(src.fill(&mut buf).unwrap(), 64);
        assert_eq!(&buf[..], &data[..64]);
        assert_eq!(src.fill(&mut buf).unwrap(), 64);
        assert_eq!(src.fill(&mut buf).unwrap(), 64);
        assert_eq!(src.fill(&mut buf).unwrap(), 8);
        assert_eq!(&buf[..8], &data[192..]);
        assert_eq!(src.fill(&mut buf).unwrap(), 0);
    }
}
