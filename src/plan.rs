//! Split plans: which files to write and how rows are shared between them.

use crate::error::{Result, SplitCountError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How data rows are shared between outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitPolicy {
    /// `floor(rows / outputs)` consecutive rows per output. The remainder is dropped.
    #[default]
    Quota,
    /// Row `i` goes to output `i mod outputs`. Nothing is dropped.
    RoundRobin,
}

/// Ordered output paths plus the policy that fills them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    outputs: Vec<PathBuf>,
    policy: SplitPolicy,
}

impl SplitPlan {
    /// # Errors
    /// [`SplitCountError::TooFew`] when fewer than two outputs are given.
    pub fn new(outputs: Vec<PathBuf>, policy: SplitPolicy) -> Result<Self> {
        if outputs.len() < 2 {
            return Err(SplitCountError::TooFew {
                given: outputs.len(),
            }
            .into());
        }
        Ok(Self { outputs, policy })
    }

    #[must_use]
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    #[must_use]
    pub const fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Rows per output under [`SplitPolicy::Quota`].
    ///
    /// # Errors
    /// [`SplitCountError::InsufficientRows`] when the quota would be zero.
    pub fn quota(&self, total_rows: usize) -> Result<usize> {
        let outputs = self.num_outputs();
        match total_rows / outputs {
            0 => Err(SplitCountError::InsufficientRows {
                rows: total_rows,
                outputs,
            }
            .into()),
            q => Ok(q),
        }
    }

    /// Rows a split of `total_rows` leaves unwritten.
    #[must_use]
    pub fn discarded(&self, total_rows: usize) -> usize {
        match self.policy {
            SplitPolicy::Quota => total_rows % self.num_outputs(),
            SplitPolicy::RoundRobin => 0,
        }
    }
}
