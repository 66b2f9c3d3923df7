//! splitcsv CLI
//!
//! Splits the given CSV file evenly into a number of parts.
//!
//! ```bash
//! # 3 parts next to the source: file1.csv, file2.csv, file3.csv
//! splitcsv /path/to/file.csv -n 3
//!
//! # Named parts: ./A.csv and ./B.csv
//! splitcsv ./file.csv -r A B
//!
//! # Parts in another directory, with a prefix, shuffled
//! splitcsv ./file.csv -o ./out/dir/ -p csv_ --shuffle
//! ```
//!
//! Exit codes: 1 source is not a file, 2 outdir is not a directory, 3 fewer
//! than 2 names, 4 split count below 2 or above the number of rows, 5 any
//! other failure.

use anyhow::Context;
use clap::{ArgAction, Parser};
use splitcsv::{split_csv, HeaderMode, SplitConfig, SplitCountError, SplitError, SplitPolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "splitcsv",
    version,
    about = "Split a CSV file evenly into a given count of parts",
    after_help = "Unless --round-robin is given, an uneven split discards the trailing rows."
)]
struct Cli {
    /// CSV file to split
    csvfile: PathBuf,

    /// Directory to place the new files [default: same as csvfile]
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Prefix for file names
    #[arg(short, long)]
    prefix: Option<String>,

    /// Shuffle the rows before splitting
    #[arg(short, long)]
    shuffle: bool,

    /// Seed for a reproducible shuffle (implies --shuffle)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of parts [default: 2]
    #[arg(short = 'n', long, conflicts_with = "rename")]
    splitnum: Option<usize>,

    /// Names for the new files, at least 2
    #[arg(short, long, num_args = 1..)]
    rename: Option<Vec<String>>,

    /// Deal rows out one at a time so that no row is discarded
    #[arg(long)]
    round_robin: bool,

    /// Treat the first row as a header without sniffing
    #[arg(long, conflicts_with = "no_header")]
    header: bool,

    /// Treat the first row as data without sniffing
    #[arg(long)]
    no_header: bool,

    /// JSON config file; command-line options override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<SplitConfig> {
        let mut config = match &self.config {
            Some(path) => SplitConfig::from_json_path(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => SplitConfig::default(),
        };
        config.source = self.csvfile;
        if let Some(outdir) = self.outdir {
            config.outdir = Some(outdir);
        }
        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
        if let Some(n) = self.splitnum {
            config.splitnum = n;
            config.rename = None;
        }
        if let Some(names) = self.rename {
            config.rename = Some(names);
        }
        config.shuffle |= self.shuffle;
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.round_robin {
            config.policy = SplitPolicy::RoundRobin;
        }
        if self.header {
            config.header = HeaderMode::Present;
        } else if self.no_header {
            config.header = HeaderMode::Absent;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("SPLITCSV_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &SplitError, named: bool) -> u8 {
    match err {
        SplitError::InvalidSource(_) => 1,
        SplitError::InvalidDestination(_) => 2,
        SplitError::InvalidSplitCount(SplitCountError::TooFew { .. }) if named => 3,
        SplitError::InvalidSplitCount(_) => 4,
        _ => 5,
    }
}

/// Run one split and map the outcome to the process exit code.
fn run(cli: Cli) -> u8 {
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return 5;
        }
    };
    let named = config.rename.is_some();

    match split_csv(&config) {
        Ok(report) => {
            for out in &report.outputs {
                println!("{}\t{}", out.path.display(), out.rows);
            }
            0
        }
        Err(e) => {
            let code = exit_code(&e, named);
            eprintln!("error: {:#}", anyhow::Error::new(e));
            code
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    ExitCode::from(run(cli))
}
