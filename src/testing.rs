//! Testing utilities for split scenarios.
//!
//! - **Fixtures**: write numbered CSV sources of any size into a temp directory
//! - **Readers**: pull data rows and raw header bytes back out of outputs
//! - **Assertions**: row-multiset equality and balanced output sizes
//!
//! # Quick Start
//!
//! ```no_run
//! use splitcsv::testing::*;
//! use splitcsv::{split_csv, SplitConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let tmp = tempfile::tempdir()?;
//! let source = write_numbered_csv(tmp.path(), "users.csv", 100)?;
//! let report = split_csv(&SplitConfig::new(&source).with_splitnum(3))?;
//! assert_eq!(report.rows_written(), 99);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
