//! # splitcsv
//!
//! Split a delimited text file into a fixed number of smaller files.
//!
//! ## Key Features
//!
//! - **Dialect sniffing** - delimiter, quote character and header presence
//!   are inferred from a short sample of the source
//! - **Header preservation** - the source header is copied byte for byte to
//!   the top of every output
//! - **Two split policies** - equal quotas with the remainder dropped, or
//!   round-robin with nothing dropped
//! - **Shuffling** - optional uniform permutation of the data rows, seedable
//!   for reproducible splits
//! - **Flexible naming** - generated `{prefix}{stem}{n}{ext}` names or an
//!   explicit list of names
//! - **Transparent compression** - `.gz`, `.zst`, `.bz2` and `.xz` sources and
//!   outputs (each behind a feature flag)
//!
//! ## Quick Start
//!
//! ```no_run
//! use splitcsv::{split_csv, SplitConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! // users.csv -> users1.csv, users2.csv, users3.csv
//! let report = split_csv(&SplitConfig::new("users.csv").with_splitnum(3))?;
//! for out in &report.outputs {
//!     println!("{}: {} rows", out.path.display(), out.rows);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Dialect
//!
//! A [`Dialect`] fixes the delimiter, quote character, header presence and
//! record terminator of a file. [`Sniffer`] infers one; it fails with
//! [`SplitError::AmbiguousDialect`] rather than guessing.
//!
//! ### Split plan
//!
//! A [`SplitPlan`] is the ordered list of output paths plus a
//! [`SplitPolicy`]:
//! - [`SplitPolicy::Quota`] - every output gets `floor(rows / outputs)` rows;
//!   the remaining `rows mod outputs` rows are dropped
//! - [`SplitPolicy::RoundRobin`] - row `i` goes to output `i mod outputs`
//!
//! ### Distribution
//!
//! A [`Distributor`] reads a [`RowSource`] and writes the plan's outputs.
//! Sources are re-readable: the quota policy counts rows in one pass and
//! writes them in another.
//!
//! ## Lower-level use
//!
//! ```no_run
//! use splitcsv::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dialect = Sniffer::new().sniff_path("events.tsv")?;
//! let source = CsvSource::open("events.tsv", dialect)?;
//! let plan = SplitPlan::new(
//!     vec!["a.tsv".into(), "b.tsv".into()],
//!     SplitPolicy::RoundRobin,
//! )?;
//! let counts = Distributor::new(dialect)
//!     .shuffle(Shuffle::Seeded(42))
//!     .distribute(&source, source.header(), &plan)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`,
//!   `compression-xz` - codecs for compressed sources and outputs (all default)
//!
//! ## Module Overview
//!
//! - [`sniffer`] - dialect inference
//! - [`distributor`] - quota and round-robin distribution, shuffling
//! - [`naming`] - output file names and name validation
//! - [`plan`] - split plans and quota arithmetic
//! - [`io`] - compression and row-level CSV reading/writing
//! - [`config`] - [`SplitConfig`] and JSON loading
//! - [`testing`] - fixtures and assertions for tests

pub mod config;
pub mod dialect;
pub mod distributor;
pub mod error;
pub mod io;
pub mod naming;
pub mod plan;
pub mod sniffer;
pub mod splitter;
pub mod testing;

pub use config::SplitConfig;
pub use dialect::{Dialect, LineTerminator};
pub use distributor::{distribute, Distributor, Shuffle};
pub use error::{Result, SplitCountError, SplitError};
pub use io::csv::{CsvSource, HeaderRow, OutputSet, OutputWriter, Row, RowSource};
pub use naming::{validate_name, OutputNaming};
pub use plan::{SplitPlan, SplitPolicy};
pub use sniffer::{HeaderMode, Sniffer};
pub use splitter::{output_paths, split_csv, OutputSummary, SplitReport};
