//! Pre-built sources and output readers.

use crate::dialect::Dialect;
use crate::error::{IoContext, Result};
use crate::io::compression::create_writer;
use crate::io::csv::{read_header, CsvSource, RowSource};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header line written by [`write_numbered_csv`].
pub const NUMBERED_HEADER: &str = "id,name,score,joined";

/// Data line `i` of [`write_numbered_csv`], without terminator.
///
/// # Example
///
/// ```
/// use splitcsv::testing::numbered_row;
///
/// assert_eq!(numbered_row(3), "3,user3,1.5,2024-01-04");
/// ```
#[must_use]
pub fn numbered_row(i: usize) -> String {
    format!("{i},user{i},{}.5,2024-01-{:02}", i / 2, i % 28 + 1)
}

/// Write a CSV with [`NUMBERED_HEADER`] and `rows` data lines numbered from 1.
///
/// The file is compressed when `name` ends in a codec suffix.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_numbered_csv(dir: &Path, name: &str, rows: usize) -> Result<PathBuf> {
    let lines = (1..=rows).map(numbered_row);
    write_lines(dir, name, std::iter::once(NUMBERED_HEADER.to_string()).chain(lines))
}

/// Write `lines` to `dir/name`, each followed by `\n`.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_lines<I, S>(dir: &Path, name: &str, lines: I) -> Result<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = dir.join(name);
    let mut w = create_writer(&path)?;
    for line in lines {
        w.write_all(line.as_ref().as_bytes()).at(&path)?;
        w.write_all(b"\n").at(&path)?;
    }
    w.finish().at(&path)?;
    Ok(path)
}

/// Data rows of an output, header skipped when `dialect.has_header` is set.
///
/// # Errors
/// Returns an error if the file cannot be read as CSV.
pub fn read_data_rows(path: &Path, dialect: Dialect) -> Result<Vec<Vec<String>>> {
    let source = CsvSource::open(path, dialect)?;
    source
        .rows()?
        .map(|row| row.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}

/// Exact bytes of the first record of `path` in `dialect`, terminator included.
///
/// Empty when the file has no records.
///
/// # Errors
/// Returns an error if the file cannot be read as CSV.
pub fn read_first_record(path: &Path, dialect: Dialect) -> Result<Vec<u8>> {
    Ok(read_header(path, &dialect)?
        .map(|h| h.raw().to_vec())
        .unwrap_or_default())
}
