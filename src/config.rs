//! Split configuration.
//!
//! [`SplitConfig`] carries everything [`split_csv`](crate::split_csv) needs.
//! It can be built in code with the `with_*` setters or loaded from a JSON
//! document; fields left out of the document take their defaults.
//!
//! ```json
//! {
//!   "source": "data/users.csv",
//!   "rename": ["train", "test"],
//!   "prefix": "users_",
//!   "shuffle": true,
//!   "seed": 7,
//!   "policy": "round-robin"
//! }
//! ```

use crate::distributor::Shuffle;
use crate::error::{IoContext, Result, SplitError};
use crate::plan::SplitPolicy;
use crate::sniffer::{DEFAULT_SAMPLE_LINES, HeaderMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// File to split.
    pub source: PathBuf,
    /// Destination directory; the source's directory when unset.
    pub outdir: Option<PathBuf>,
    /// Number of outputs when `rename` is unset.
    pub splitnum: usize,
    /// Explicit output names. Overrides `splitnum`.
    pub rename: Option<Vec<String>>,
    /// Prepended to every output name.
    pub prefix: String,
    pub shuffle: bool,
    /// Makes the shuffle reproducible.
    pub seed: Option<u64>,
    pub policy: SplitPolicy,
    pub header: HeaderMode,
    /// Records sampled when sniffing the dialect.
    pub sample_lines: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            outdir: None,
            splitnum: 2,
            rename: None,
            prefix: String::new(),
            shuffle: false,
            seed: None,
            policy: SplitPolicy::Quota,
            header: HeaderMode::Detect,
            sample_lines: DEFAULT_SAMPLE_LINES,
        }
    }
}

impl SplitConfig {
    #[must_use]
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// [`SplitError::InvalidConfig`] when the document is malformed or has unknown fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SplitError::InvalidConfig(e.to_string()))
    }

    /// Load a JSON configuration file.
    ///
    /// # Errors
    /// An I/O error when the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).at(path)?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    #[must_use]
    pub const fn with_splitnum(mut self, splitnum: usize) -> Self {
        self.splitnum = splitnum;
        self
    }

    #[must_use]
    pub fn with_rename<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rename = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub const fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Enable shuffling with a fixed seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_header(mut self, header: HeaderMode) -> Self {
        self.header = header;
        self
    }

    #[must_use]
    pub const fn with_sample_lines(mut self, n: usize) -> Self {
        self.sample_lines = n;
        self
    }

    /// Outputs that will be produced: `rename.len()` when names are given, else `splitnum`.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.rename.as_ref().map_or(self.splitnum, Vec::len)
    }

    #[must_use]
    pub const fn shuffle_mode(&self) -> Shuffle {
        match (self.shuffle, self.seed) {
            (false, _) => Shuffle::Off,
            (true, None) => Shuffle::Random,
            (true, Some(seed)) => Shuffle::Seeded(seed),
        }
    }
}
