//! Dialect sniffing for delimited text of unknown format.
//!
//! The sniffer reads a short leading sample (ten records by default) and
//! infers three things from it:
//!
//! 1. **Quote character** - the candidate that most often encloses a whole
//!    field, `"` when none does.
//! 2. **Delimiter** - the first candidate, in preference order, that occurs
//!    the same non-zero number of times outside quotes on every sampled record.
//! 3. **Header presence** - each data column that has a single consistent
//!    value kind votes on whether the first record's cell fits that kind.
//!    Negative votes mean the first record is data.
//!
//! Sniffing never writes. [`Sniffer::sniff_reader`] puts the cursor back
//! where it found it.

use crate::dialect::{Dialect, LineTerminator};
use crate::error::{IoContext, Result, SplitError};
use crate::io::compression::open_reader;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::LazyLock;

/// Records read for a sample unless configured otherwise.
pub const DEFAULT_SAMPLE_LINES: usize = 10;

/// Delimiters tried, in order of preference.
pub const DELIMITER_CANDIDATES: &[u8] = b",\t;|:";

/// Quote characters tried, in order of preference.
pub const QUOTE_CANDIDATES: &[u8] = b"\"'";

/// Sampling stops once this many bytes have been read.
const MAX_SAMPLE_BYTES: usize = 1 << 20;

/// How the header row is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Infer from the sample.
    #[default]
    Detect,
    /// The first record is always a header.
    Present,
    /// The file has no header.
    Absent,
}

/// Infers a [`Dialect`] from a sample of the input.
#[derive(Debug, Clone, Copy)]
pub struct Sniffer {
    sample_lines: usize,
    header: HeaderMode,
}

impl Default for Sniffer {
    fn default() -> Self {
        Self {
            sample_lines: DEFAULT_SAMPLE_LINES,
            header: HeaderMode::Detect,
        }
    }
}

impl Sniffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records to sample; values below 1 are raised to 1.
    #[must_use]
    pub fn sample_lines(mut self, n: usize) -> Self {
        self.sample_lines = n.max(1);
        self
    }

    #[must_use]
    pub const fn header_mode(mut self, mode: HeaderMode) -> Self {
        self.header = mode;
        self
    }

    /// Sniff the file at `path`, decompressing it if needed.
    ///
    /// # Errors
    /// [`SplitError::AmbiguousDialect`] when no delimiter is consistent, or an
    /// I/O error when the file cannot be read.
    pub fn sniff_path(&self, path: impl AsRef<Path>) -> Result<Dialect> {
        let path = path.as_ref();
        let mut rdr = BufReader::new(open_reader(path)?);
        let sample = self.read_sample(&mut rdr).at(path)?;
        self.infer(&sample)
            .ok_or_else(|| SplitError::AmbiguousDialect(path.display().to_string()))
    }

    /// Sniff from the current position of `reader`, then seek back to it.
    ///
    /// # Errors
    /// [`SplitError::AmbiguousDialect`] when no delimiter is consistent, or an
    /// I/O error from reading or seeking.
    pub fn sniff_reader<R: Read + Seek>(&self, reader: &mut R) -> Result<Dialect> {
        let start = reader.stream_position().at("<reader>")?;
        let sample = {
            let mut rdr = BufReader::new(&mut *reader);
            self.read_sample(&mut rdr)
        };
        reader.seek(SeekFrom::Start(start)).at("<reader>")?;
        let sample = sample.at("<reader>")?;
        self.infer(&sample)
            .ok_or_else(|| SplitError::AmbiguousDialect("<reader>".to_string()))
    }

    /// Sniff an in-memory sample. Only the first `sample_lines` records are used.
    ///
    /// # Errors
    /// [`SplitError::AmbiguousDialect`] when no delimiter is consistent.
    pub fn sniff_bytes(&self, sample: &[u8]) -> Result<Dialect> {
        let mut rdr = sample;
        let sample = self.read_sample(&mut rdr).at("<sample>")?;
        self.infer(&sample)
            .ok_or_else(|| SplitError::AmbiguousDialect("<sample>".to_string()))
    }

    fn read_sample<R: BufRead + ?Sized>(&self, r: &mut R) -> std::io::Result<Vec<u8>> {
        let mut sample = Vec::new();
        let mut scan = QuoteScan::new(b'"');
        let mut records = 0;
        while records < self.sample_lines && sample.len() < MAX_SAMPLE_BYTES {
            let start = sample.len();
            if r.read_until(b'\n', &mut sample)? == 0 {
                break;
            }
            scan.feed(&sample[start..], |_, _| {});
            if !scan.in_quotes {
                records += 1;
            }
        }
        Ok(sample)
    }

    fn infer(&self, sample: &[u8]) -> Option<Dialect> {
        let text = String::from_utf8_lossy(sample);
        let quote = guess_quote(&text);
        let records = split_records(&text, quote);
        let delimiter = guess_delimiter(&records, quote)?;
        let terminator = if records.first().is_some_and(|r| r.ends_with('\r')) {
            LineTerminator::CrLf
        } else {
            LineTerminator::Lf
        };
        let mut dialect = Dialect {
            delimiter,
            quote,
            has_header: true,
            terminator,
        };
        dialect.has_header = match self.header {
            HeaderMode::Present => true,
            HeaderMode::Absent => false,
            HeaderMode::Detect => detect_header(sample, &dialect),
        };
        tracing::debug!(
            delimiter = %char::from(delimiter).escape_default(),
            quote = %char::from(quote),
            has_header = dialect.has_header,
            records = records.len(),
            "sniffed dialect"
        );
        Some(dialect)
    }
}

/// Quote candidate that encloses the most whole fields, `"` when none does.
fn guess_quote(text: &str) -> u8 {
    // Opener at a field start, a closer on the same line, doubled quotes allowed inside.
    static ENCLOSED: LazyLock<Vec<(u8, Regex)>> = LazyLock::new(|| {
        QUOTE_CANDIDATES
            .iter()
            .map(|&q| {
                let delims = regex::escape(&String::from_utf8_lossy(DELIMITER_CANDIDATES));
                let c = regex::escape(&char::from(q).to_string());
                let pattern = format!(r"(?m)(?:^|[{delims}])[ ]*{c}(?:[^{c}\r\n]|{c}{c})*{c}[ ]*");
                (q, Regex::new(&pattern).expect("quote field pattern is valid"))
            })
            .collect()
    });
    let mut best = (QUOTE_CANDIDATES[0], 0usize);
    for (q, re) in ENCLOSED.iter() {
        let hits = re
            .find_iter(text)
            .filter(|m| ends_field(&text.as_bytes()[m.end()..]))
            .count();
        if hits > best.1 {
            best = (*q, hits);
        }
    }
    best.0
}

/// Whether a closing quote followed by `rest` ends its field.
fn ends_field(rest: &[u8]) -> bool {
    rest.first()
        .is_none_or(|&b| matches!(b, b'\r' | b'\n') || DELIMITER_CANDIDATES.contains(&b))
}

/// Quote tracking as a CSV reader does it: a quote opens a field only at a
/// line start or right after a delimiter candidate, and a doubled quote inside
/// a quoted field is literal.
struct QuoteScan {
    quote: u8,
    in_quotes: bool,
    prev: Option<u8>,
}

impl QuoteScan {
    const fn new(quote: u8) -> Self {
        Self {
            quote,
            in_quotes: false,
            prev: None,
        }
    }

    /// Consume `chunk`, calling `f` with every byte that lies outside quotes.
    fn feed(&mut self, chunk: &[u8], mut f: impl FnMut(usize, u8)) {
        let mut i = 0;
        while i < chunk.len() {
            let b = chunk[i];
            if self.in_quotes {
                if b == self.quote {
                    if chunk.get(i + 1) == Some(&self.quote) {
                        i += 1;
                    } else {
                        self.in_quotes = false;
                    }
                }
            } else if b == self.quote
                && self
                    .prev
                    .is_none_or(|p| p == b'\n' || DELIMITER_CANDIDATES.contains(&p))
            {
                self.in_quotes = true;
            } else {
                f(i, b);
            }
            self.prev = Some(chunk[i]);
            i += 1;
        }
    }
}

/// Split on newlines that are not inside quotes, dropping blank records.
fn split_records(text: &str, quote: u8) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    QuoteScan::new(quote).feed(text.as_bytes(), |i, b| {
        if b == b'\n' {
            out.push(&text[start..i]);
            start = i + 1;
        }
    });
    out.push(&text[start..]);
    out.retain(|r| !r.trim().is_empty());
    out
}

/// Occurrences of `delim` outside quoted text.
fn count_unquoted(record: &str, delim: u8, quote: u8) -> usize {
    let mut n = 0;
    QuoteScan::new(quote).feed(record.as_bytes(), |_, b| {
        if b == delim {
            n += 1;
        }
    });
    n
}

fn guess_delimiter(records: &[&str], quote: u8) -> Option<u8> {
    let (first, rest) = records.split_first()?;
    DELIMITER_CANDIDATES.iter().copied().find(|&d| {
        let n = count_unquoted(first, d, quote);
        n > 0 && rest.iter().all(|r| count_unquoted(r, d, quote) == n)
    })
}

/// Coarse value kind of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Boolean,
    Date,
    Text(usize),
}

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").expect("integer pattern is valid"));
static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?$").expect("float pattern is valid")
});
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?|\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4})$",
    )
    .expect("date pattern is valid")
});

fn classify(cell: &str) -> Option<CellKind> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    let kind = if INTEGER.is_match(cell) {
        CellKind::Integer
    } else if FLOAT.is_match(cell) {
        CellKind::Float
    } else if ["true", "false", "yes", "no"]
        .iter()
        .any(|b| cell.eq_ignore_ascii_case(b))
    {
        CellKind::Boolean
    } else if DATE.is_match(cell) {
        CellKind::Date
    } else {
        CellKind::Text(cell.chars().count())
    };
    Some(kind)
}

/// Single kind shared by all non-empty cells; integers widen to floats.
fn column_kind(cells: impl Iterator<Item = CellKind>) -> Option<CellKind> {
    let mut kind = None;
    for k in cells {
        kind = match (kind, k) {
            (None, k) => Some(k),
            (Some(a), b) if a == b => Some(a),
            (Some(CellKind::Integer | CellKind::Float), CellKind::Integer | CellKind::Float) => {
                Some(CellKind::Float)
            }
            _ => return None,
        };
    }
    kind
}

fn fits(kind: CellKind, cell: &str) -> bool {
    match (kind, classify(cell)) {
        (CellKind::Text(len), Some(CellKind::Text(n))) => len == n,
        (CellKind::Text(len), Some(_)) => cell.trim().chars().count() == len,
        (CellKind::Float, Some(CellKind::Integer | CellKind::Float)) => true,
        (k, Some(c)) => k == c,
        (_, None) => false,
    }
}

fn detect_header(sample: &[u8], dialect: &Dialect) -> bool {
    let mut rdr = dialect.reader_builder().from_reader(sample);
    let rows: Vec<_> = rdr.records().filter_map(std::result::Result::ok).collect();
    let Some((header, data)) = rows.split_first() else {
        return true;
    };
    if data.is_empty() {
        return true;
    }
    let mut votes = 0i64;
    for (col, head) in header.iter().enumerate() {
        let kind = column_kind(data.iter().filter_map(|r| r.get(col)).filter_map(classify));
        if let Some(kind) = kind {
            votes += if fits(kind, head) { -1 } else { 1 };
        }
    }
    tracing::debug!(votes, "header votes");
    votes >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cells() {
        assert_eq!(classify("42"), Some(CellKind::Integer));
        assert_eq!(classify("-3.5e2"), Some(CellKind::Float));
        assert_eq!(classify("TRUE"), Some(CellKind::Boolean));
        assert_eq!(classify("2024-01-31"), Some(CellKind::Date));
        assert_eq!(classify("31/01/2024"), Some(CellKind::Date));
        assert_eq!(classify("abc"), Some(CellKind::Text(3)));
        assert_eq!(classify("   "), None);
    }

    #[test]
    fn mixed_numbers_widen_to_float() {
        let kinds = [CellKind::Integer, CellKind::Float, CellKind::Integer];
        assert_eq!(column_kind(kinds.into_iter()), Some(CellKind::Float));
        let kinds = [CellKind::Integer, CellKind::Text(2)];
        assert_eq!(column_kind(kinds.into_iter()), None);
    }

    #[test]
    fn quoted_newlines_stay_in_one_record() {
        let recs = split_records("a,\"x\ny\"\n1,2\n\n", b'"');
        assert_eq!(recs, vec!["a,\"x\ny\"", "1,2"]);
    }

    #[test]
    fn delimiters_inside_quotes_are_ignored() {
        assert_eq!(count_unquoted("\"a,b\",c", b',', b'"'), 1);
        assert_eq!(count_unquoted("'a;b';c", b';', b'\''), 1);
    }

    #[test]
    fn single_quotes_win_when_they_enclose_fields() {
        assert_eq!(guess_quote("'a';'b'\n'c';'d'\n"), b'\'');
        assert_eq!(guess_quote("a,b\n1,2\n"), b'"');
        assert_eq!(guess_quote("'it''s',x\n"), b'\'');
    }

    #[test]
    fn apostrophes_inside_fields_are_not_quotes() {
        assert_eq!(guess_quote("id,era\n1,'90s\n2,modern\n3,'80s\n"), b'"');
        assert_eq!(guess_quote("a,'b'c\n"), b'"');
        assert_eq!(guess_quote("\"x\",'y\n"), b'"');
    }
}
