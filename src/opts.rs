//! Configuration for CSV parsing and writing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration shared by every parser and writer in the crate.
///
/// The four structural bytes must be pairwise distinct, and the optional
/// line-ending prefix must differ from all of them; [`CsvOpts::valid`]
/// checks this. Parsers constructed from invalid options latch
/// [`InvalidOptions`](crate::CsvError::InvalidOptions) and produce nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CsvOpts {
    /// Field delimiter (default: b',')
    pub delimiter: u8,
    /// Quote character (default: b'"')
    pub quote: u8,
    /// Record delimiter (default: b'\n')
    pub line_end: u8,
    /// Optional byte expected immediately before `line_end`
    /// (default: Some(b'\r'), i.e. CRLF records)
    pub line_end_prefix: Option<u8>,
    /// Upper bound on chunk advances within a single `next` call.
    /// A runaway guard, not a field-length limit (default: 65_536).
    pub max_iter: usize,
}

impl Default for CsvOpts {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            line_end: b'\n',
            line_end_prefix: Some(b'\r'),
            max_iter: 65_536,
        }
    }
}

impl CsvOpts {
    /// Create a CSV configuration (comma-separated, CRLF records).
    pub fn csv() -> Self {
        Self::default()
    }

    /// Create a TSV configuration (tab-separated).
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }

    /// Create a PSV configuration (pipe-separated).
    pub fn psv() -> Self {
        Self {
            delimiter: b'|',
            ..Self::default()
        }
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character.
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Set the record delimiter.
    pub fn with_line_end(mut self, line_end: u8) -> Self {
        self.line_end = line_end;
        self
    }

    /// Set or clear the line-ending prefix. `None` means records end on the
    /// bare `line_end` byte and the prefix byte is ordinary data.
    pub fn with_line_end_prefix(mut self, prefix: Option<u8>) -> Self {
        self.line_end_prefix = prefix;
        self
    }

    /// Set the chunk-advance guard.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Check the distinctness invariant over the structural bytes.
    pub fn valid(&self) -> bool {
        let (d, q, e) = (self.delimiter, self.quote, self.line_end);
        if d == q || d == e || q == e {
            return false;
        }
        match self.line_end_prefix {
            Some(p) => p != d && p != q && p != e,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CsvOpts::default().valid());
        assert!(CsvOpts::tsv().valid());
        assert!(CsvOpts::psv().valid());
    }

    #[test]
    fn test_overlapping_bytes_are_invalid() {
        assert!(!CsvOpts::default().with_delimiter(b'"').valid());
        assert!(!CsvOpts::default().with_quote(b'\n').valid());
        assert!(!CsvOpts::default().with_line_end_prefix(Some(b',')).valid());
    }

    #[test]
    fn test_lf_only_records() {
        let opts = CsvOpts::default().with_line_end_prefix(None);
        assert!(opts.valid());
        // Without a prefix, b'\r' colliding with nothing is fine.
        assert!(CsvOpts::default()
            .with_delimiter(b'\r')
            .with_line_end_prefix(None)
            .valid());
    }
}
