//! The delimiter/quoting/header convention of a tabular text file.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

/// Record terminator observed in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    #[default]
    Lf,
    CrLf,
}

impl LineTerminator {
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }

    const fn to_csv(self) -> Terminator {
        match self {
            Self::Lf => Terminator::Any(b'\n'),
            Self::CrLf => Terminator::CRLF,
        }
    }
}

/// Inferred once per source file and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    pub has_header: bool,
    #[serde(default)]
    pub terminator: LineTerminator,
}

impl Default for Dialect {
    /// Comma separated, double-quoted, with a header row.
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
            terminator: LineTerminator::Lf,
        }
    }
}

impl Dialect {
    #[must_use]
    pub const fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Reader configured for this dialect.
    ///
    /// Headers are never consumed by the reader itself; callers split the
    /// header off so its raw bytes can be reproduced verbatim.
    #[must_use]
    pub fn reader_builder(&self) -> ReaderBuilder {
        let mut b = ReaderBuilder::new();
        b.delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(false)
            .flexible(true);
        b
    }

    /// Writer producing rows in the same dialect as the source.
    #[must_use]
    pub fn writer_builder(&self) -> WriterBuilder {
        let mut b = WriterBuilder::new();
        b.delimiter(self.delimiter)
            .quote(self.quote)
            .quote_style(QuoteStyle::Necessary)
            .terminator(self.terminator.to_csv())
            .has_headers(false)
            .flexible(true);
        b
    }
}
