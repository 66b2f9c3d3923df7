//! Row-level CSV plumbing: re-openable row sources and scoped output writers.
//!
//! # Design notes
//! - Header bytes are carried verbatim from the source to every output; data
//!   rows are re-serialized in the source dialect.
//! - A [`RowSource`] hands out a fresh pass on every [`RowSource::rows`] call.
//!   File sources re-open the file, which also works for compressed input.
//! - Writers are plain owned values. Dropping an [`OutputWriter`] or an
//!   [`OutputSet`] closes every file it holds, whichever way the caller exits.

use crate::dialect::Dialect;
use crate::error::{IoContext, Result, SplitError};
use crate::io::compression::{create_writer, open_reader, FinishWrite};
use csv::StringRecord;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// One data record of the source.
pub type Row = StringRecord;

/// Iterator over one pass of data rows.
pub type Rows<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// The header record, kept both parsed and as the exact bytes it had in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    fields: Row,
    raw: Vec<u8>,
}

impl HeaderRow {
    /// Build a header from the raw bytes of the first source record.
    ///
    /// # Errors
    /// Fails when `raw` is not a single valid record in `dialect`.
    pub fn from_raw(raw: Vec<u8>, dialect: &Dialect) -> Result<Self> {
        let mut rdr = dialect.reader_builder().from_reader(raw.as_slice());
        let mut fields = Row::new();
        rdr.read_record(&mut fields)?;
        Ok(Self { fields, raw })
    }

    /// Header for in-memory use, serialized in `dialect`.
    ///
    /// # Errors
    /// Fails when the fields cannot be serialized.
    pub fn from_fields<I, S>(fields: I, dialect: &Dialect) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Row = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        let mut wtr = dialect.writer_builder().from_writer(Vec::new());
        wtr.write_record(&fields)?;
        let raw = wtr
            .into_inner()
            .map_err(|e| SplitError::io("<header>", e.into_error()))?;
        Ok(Self { fields, raw })
    }

    #[must_use]
    pub const fn fields(&self) -> &Row {
        &self.fields
    }

    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn write_to(&self, w: &mut dyn Write, dialect: &Dialect) -> io::Result<()> {
        w.write_all(&self.raw)?;
        if !self.raw.ends_with(b"\n") {
            w.write_all(dialect.terminator.as_bytes())?;
        }
        Ok(())
    }
}

/// First record of `path` as the `csv` reader delimits it, kept with its exact bytes.
///
/// Blank lines in front of the record are not part of it. `None` when the
/// file holds no record at all.
pub(crate) fn read_header(path: &Path, dialect: &Dialect) -> Result<Option<HeaderRow>> {
    let mut rdr = dialect.reader_builder().from_reader(open_reader(path)?);
    let mut first = Row::new();
    if !rdr.read_record(&mut first)? {
        return Ok(None);
    }
    let start = first.position().map_or(0, csv::Position::byte);
    let end = rdr.position().byte();

    // One byte past the record, to catch the `\n` of a CRLF pair.
    let mut head = Vec::new();
    open_reader(path)?
        .take(end.saturating_add(1))
        .read_to_end(&mut head)
        .at(path)?;
    let mut end = usize::try_from(end).map_or(head.len(), |e| e.min(head.len()));
    if head[..end].ends_with(b"\r") && head.get(end) == Some(&b'\n') {
        end += 1;
    }
    // The reader skips blank lines before a record without moving its start.
    let start = usize::try_from(start).map_or(0, |s| s.min(end));
    let start = head[start..end]
        .iter()
        .position(|&b| !matches!(b, b'\r' | b'\n'))
        .map_or(end, |i| start + i);
    HeaderRow::from_raw(head[start..end].to_vec(), dialect).map(Some)
}

/// A re-readable sequence of data rows.
pub trait RowSource {
    /// Start a new pass over every data row, header excluded.
    ///
    /// # Errors
    /// Fails when the underlying storage cannot be opened.
    fn rows(&self) -> Result<Rows<'_>>;

    /// Number of data rows, computed with a full pass unless overridden.
    ///
    /// # Errors
    /// Fails when any row cannot be read.
    fn row_count(&self) -> Result<usize> {
        let mut n = 0;
        for row in self.rows()? {
            row?;
            n += 1;
        }
        Ok(n)
    }
}

impl RowSource for Vec<Row> {
    fn rows(&self) -> Result<Rows<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }

    fn row_count(&self) -> Result<usize> {
        Ok(self.len())
    }
}

impl RowSource for [Row] {
    fn rows(&self) -> Result<Rows<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }

    fn row_count(&self) -> Result<usize> {
        Ok(self.len())
    }
}

/// Rows of a delimited file on disk, optionally compressed.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    dialect: Dialect,
    header: Option<HeaderRow>,
}

impl CsvSource {
    /// Open `path` and split off its header when `dialect.has_header` is set.
    ///
    /// # Errors
    /// Fails when the file cannot be read or the header is not a valid record.
    pub fn open(path: impl AsRef<Path>, dialect: Dialect) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let header = if dialect.has_header {
            read_header(&path, &dialect)?
        } else {
            None
        };
        Ok(Self {
            path,
            dialect,
            header,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    #[must_use]
    pub const fn header(&self) -> Option<&HeaderRow> {
        self.header.as_ref()
    }
}

impl RowSource for CsvSource {
    fn rows(&self) -> Result<Rows<'_>> {
        let records = self
            .dialect
            .reader_builder()
            .from_reader(open_reader(&self.path)?)
            .into_records()
            .skip(usize::from(self.header.is_some()))
            .map(|rec| rec.map_err(SplitError::from));
        Ok(Box::new(records))
    }
}

/// One output file in the course of being written.
pub struct OutputWriter {
    path: PathBuf,
    inner: csv::Writer<Box<dyn FinishWrite>>,
    rows: usize,
}

impl OutputWriter {
    /// Create or truncate `path` and write the header first when one is given.
    ///
    /// # Errors
    /// Fails when the file cannot be created or the header cannot be written.
    pub fn create(path: impl AsRef<Path>, dialect: &Dialect, header: Option<&HeaderRow>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut w = create_writer(&path)?;
        if let Some(h) = header {
            h.write_to(&mut w, dialect).at(&path)?;
        }
        Ok(Self {
            inner: dialect.writer_builder().from_writer(w),
            path,
            rows: 0,
        })
    }

    /// # Errors
    /// Fails when the row cannot be serialized or written.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        self.inner.write_record(row)?;
        self.rows += 1;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush everything and close the file, returning the number of data rows written.
    ///
    /// Compressed outputs get their trailer here.
    ///
    /// # Errors
    /// Fails when buffered data, or the trailer, cannot be written.
    pub fn finish(self) -> Result<usize> {
        let Self { path, inner, rows } = self;
        let w = inner
            .into_inner()
            .map_err(|e| SplitError::io(&path, e.into_error()))?;
        w.finish().at(&path)?;
        Ok(rows)
    }
}

/// Every output of one pass, opened together and released together.
pub struct OutputSet {
    writers: Vec<OutputWriter>,
}

impl OutputSet {
    /// Open one writer per path, in order.
    ///
    /// If any path fails, the writers opened so far are dropped before returning.
    ///
    /// # Errors
    /// Fails on the first path that cannot be created.
    pub fn create<P: AsRef<Path>>(paths: &[P], dialect: &Dialect, header: Option<&HeaderRow>) -> Result<Self> {
        let writers = paths
            .iter()
            .map(|p| OutputWriter::create(p, dialect, header))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { writers })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// Write `row` to the output at `index`.
    ///
    /// # Errors
    /// Fails when the write fails or `index` is out of range.
    pub fn write(&mut self, index: usize, row: &Row) -> Result<()> {
        let len = self.writers.len();
        let w = self.writers.get_mut(index).ok_or_else(|| {
            SplitError::io(
                "<output set>",
                io::Error::new(io::ErrorKind::InvalidInput, format!("output {index} of {len}")),
            )
        })?;
        w.write_row(row)
    }

    /// Flush and close every output, returning per-output row counts in order.
    ///
    /// # Errors
    /// Fails on the first output that cannot be flushed; the rest are still closed.
    pub fn finish(self) -> Result<Vec<usize>> {
        self.writers.into_iter().map(OutputWriter::finish).collect()
    }
}
