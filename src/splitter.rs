//! End-to-end split of one source file.

use crate::config::SplitConfig;
use crate::dialect::Dialect;
use crate::distributor::Distributor;
use crate::error::{Result, SplitCountError, SplitError};
use crate::io::csv::{CsvSource, RowSource};
use crate::naming::{validate_name, OutputNaming};
use crate::plan::SplitPlan;
use crate::sniffer::Sniffer;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One written output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    pub path: PathBuf,
    /// Data rows written, header excluded.
    pub rows: usize,
}

/// Outcome of [`split_csv`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub dialect: Dialect,
    pub outputs: Vec<OutputSummary>,
    /// Data rows in the source.
    pub total_rows: usize,
    /// Data rows the quota policy left out.
    pub discarded: usize,
}

impl SplitReport {
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.outputs.iter().map(|o| o.rows).sum()
    }
}

/// Resolve the output paths of `config` without writing anything.
///
/// One path is built per requested output, so callers bound
/// `config.splitnum` first; [`split_csv`] bounds it by the source's row count.
///
/// # Errors
/// `InvalidFilename` for a bad explicit name or an output that would
/// overwrite the source.
pub fn output_paths(config: &SplitConfig) -> Result<Vec<PathBuf>> {
    let naming = OutputNaming::for_source(&config.source, config.outdir.as_deref(), &config.prefix);
    let paths = match &config.rename {
        Some(names) => naming.explicit(names)?,
        None => naming.generated(config.splitnum),
    };
    if let Some(clash) = paths.iter().find(|p| same_file(p, &config.source)) {
        return Err(SplitError::InvalidFilename(clash.display().to_string()));
    }
    Ok(paths)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Split `config.source` into the outputs described by `config`.
///
/// Every check runs before the first output is opened: the source must be a
/// file, the output directory must exist, explicit names must be valid and at
/// least two outputs must be requested. The dialect is then sniffed and the
/// rows counted; there must be at least one data row per output under either
/// policy. Only then are output paths built and rows distributed.
///
/// # Errors
/// Any [`SplitError`]; see the module docs of [`crate::error`] for when
/// partial output can remain.
pub fn split_csv(config: &SplitConfig) -> Result<SplitReport> {
    let source = config.source.as_path();
    if !source.is_file() {
        return Err(SplitError::InvalidSource(source.to_path_buf()));
    }
    let outdir = config
        .outdir
        .clone()
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    // An empty parent means the current directory.
    if !outdir.as_os_str().is_empty() && !outdir.is_dir() {
        return Err(SplitError::InvalidDestination(outdir));
    }

    if let Some(names) = &config.rename {
        names.iter().try_for_each(|n| validate_name(n))?;
    }
    let outputs = config.num_outputs();
    if outputs < 2 {
        return Err(SplitCountError::TooFew { given: outputs }.into());
    }

    let dialect = Sniffer::new()
        .sample_lines(config.sample_lines)
        .header_mode(config.header)
        .sniff_path(source)?;
    let rows = CsvSource::open(source, dialect)?;
    let total_rows = rows.row_count()?;
    if outputs > total_rows {
        return Err(SplitCountError::InsufficientRows {
            rows: total_rows,
            outputs,
        }
        .into());
    }

    let plan = SplitPlan::new(output_paths(config)?, config.policy)?;

    let counts = Distributor::new(dialect)
        .shuffle(config.shuffle_mode())
        .with_row_count(total_rows)
        .distribute(&rows, rows.header(), &plan)?;

    let report = SplitReport {
        dialect,
        outputs: plan
            .outputs()
            .iter()
            .cloned()
            .zip(counts)
            .map(|(path, rows)| OutputSummary { path, rows })
            .collect(),
        total_rows,
        discarded: plan.discarded(total_rows),
    };
    tracing::info!(
        source = %source.display(),
        outputs = report.outputs.len(),
        written = report.rows_written(),
        discarded = report.discarded,
        "split complete"
    );
    Ok(report)
}
