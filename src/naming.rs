//! Output file naming.
//!
//! Generated names follow `{prefix}{stem}{index}{extension}` with `index`
//! counting from 1. Explicit names follow `{prefix}{name}{extension}`.
//! Both land in the output directory, which defaults to the source's own.

use crate::error::{Result, SplitError};
use crate::io::compression::split_file_name;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Characters no output name may contain.
pub const RESERVED_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Name reserved on its own.
pub const RESERVED_NAME: &str = "null";

/// Check one explicit output name.
///
/// # Errors
/// [`SplitError::InvalidFilename`] for an empty name, the reserved token
/// `null`, or a name containing any of [`RESERVED_CHARS`].
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == RESERVED_NAME || name.contains(RESERVED_CHARS) {
        return Err(SplitError::InvalidFilename(name.to_string()));
    }
    Ok(())
}

/// Where and how outputs of one source are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    dir: PathBuf,
    prefix: String,
    stem: String,
    extension: String,
}

impl OutputNaming {
    /// Naming for `source`, placing outputs in `outdir` or next to the source.
    #[must_use]
    pub fn for_source(source: &Path, outdir: Option<&Path>, prefix: &str) -> Self {
        let (stem, extension) = split_file_name(source);
        let dir = outdir
            .map(Path::to_path_buf)
            .or_else(|| source.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self {
            dir,
            prefix: prefix.to_string(),
            stem,
            extension,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Extension carried over from the source, including the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `count` generated paths, numbered from 1.
    #[must_use]
    pub fn generated(&self, count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|i| self.path_for(&format!("{}{i}", self.stem)))
            .collect()
    }

    /// Paths for explicit names, after validating every name.
    ///
    /// # Errors
    /// [`SplitError::InvalidFilename`] for the first invalid or repeated name.
    pub fn explicit<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                validate_name(name)?;
                if !seen.insert(name) {
                    return Err(SplitError::InvalidFilename(name.to_string()));
                }
                Ok(self.path_for(name))
            })
            .collect()
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}{name}{}", self.prefix, self.extension))
    }
}
