//! Error taxonomy for splitting operations.
//!
//! Every variant except [`SplitError::Io`] and [`SplitError::Csv`] is raised
//! before the first output file is opened. I/O and CSV errors can surface
//! mid-write; they abort the remaining writes and leave files that were
//! already completed in place.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = SplitError> = std::result::Result<T, E>;

/// Why a requested number of outputs cannot be honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitCountError {
    /// Fewer than two outputs were requested.
    #[error("at least 2 outputs are required, given: {given}")]
    TooFew { given: usize },

    /// The quota policy would place zero rows in each output.
    #[error("{outputs} outputs requested but only {rows} data rows are available")]
    InsufficientRows { rows: usize, outputs: usize },
}

/// Errors produced while validating, sniffing or splitting a source file.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The source is missing or is not a regular file.
    #[error("source can't be used: {}", .0.display())]
    InvalidSource(PathBuf),

    /// The output directory is missing or is not a directory.
    #[error("output directory can't be used: {}", .0.display())]
    InvalidDestination(PathBuf),

    #[error("invalid split count: {0}")]
    InvalidSplitCount(#[from] SplitCountError),

    /// An output name is empty, reserved, duplicated or would overwrite the source.
    #[error("invalid output name {0:?}")]
    InvalidFilename(String),

    /// No candidate delimiter was consistent across the sample of the named input.
    #[error("could not determine the delimiter of {0}")]
    AmbiguousDialect(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl SplitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` when the error was raised before any output was touched.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Io { .. } | Self::Csv(_))
    }
}

/// Attach a path to a bare `io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| SplitError::io(path, e))
    }
}
