//! Row distribution across the outputs of a [`SplitPlan`].
//!
//! Two policies are supported:
//!
//! - **Quota**: outputs are written one after another, each receiving exactly
//!   `floor(rows / outputs)` consecutive rows. Rows past
//!   `quota * outputs` are never read, so the remainder is dropped.
//! - **RoundRobin**: every output is opened up front and row `i` goes to
//!   output `i mod outputs`. Output sizes differ by at most one row.
//!
//! Shuffling materializes every data row in memory and applies a uniform
//! permutation before distribution.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::io::csv::{HeaderRow, OutputSet, OutputWriter, Row, RowSource, Rows};
use crate::plan::{SplitPlan, SplitPolicy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row order applied before distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Source order.
    #[default]
    Off,
    /// A fresh random permutation on every run.
    Random,
    /// A permutation reproducible from the seed.
    Seeded(u64),
}

impl Shuffle {
    #[must_use]
    pub const fn is_on(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Permute `rows` in place.
    pub fn apply(self, rows: &mut [Row]) {
        match self {
            Self::Off => {}
            Self::Random => rows.shuffle(&mut rand::thread_rng()),
            Self::Seeded(seed) => rows.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
    }
}

/// Writes rows from a [`RowSource`] into the outputs of a plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distributor {
    dialect: Dialect,
    shuffle: Shuffle,
    row_count: Option<usize>,
}

impl Distributor {
    /// Distributor writing outputs in `dialect`.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn shuffle(mut self, shuffle: Shuffle) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Use a known data row count instead of counting with an extra pass.
    #[must_use]
    pub const fn with_row_count(mut self, rows: usize) -> Self {
        self.row_count = Some(rows);
        self
    }

    /// Write every output of `plan`, header first when given.
    ///
    /// Returns the number of data rows written to each output, in plan order.
    ///
    /// # Errors
    /// Under the quota policy, `InvalidSplitCount` when there are fewer data
    /// rows than outputs; this is raised before any file is opened. Any read
    /// or write failure aborts the remaining writes. Outputs completed before
    /// the failure stay on disk.
    pub fn distribute<S>(&self, source: &S, header: Option<&HeaderRow>, plan: &SplitPlan) -> Result<Vec<usize>>
    where
        S: RowSource + ?Sized,
    {
        let counts = match plan.policy() {
            SplitPolicy::Quota => self.by_quota(source, header, plan)?,
            SplitPolicy::RoundRobin => self.round_robin(source, header, plan)?,
        };
        tracing::debug!(?counts, policy = ?plan.policy(), "distributed rows");
        Ok(counts)
    }

    fn by_quota<S>(&self, source: &S, header: Option<&HeaderRow>, plan: &SplitPlan) -> Result<Vec<usize>>
    where
        S: RowSource + ?Sized,
    {
        let total = match self.row_count {
            Some(n) => n,
            None => source.row_count()?,
        };
        let quota = plan.quota(total)?;
        let discarded = plan.discarded(total);
        if discarded > 0 {
            tracing::warn!(total, quota, discarded, "uneven split, trailing rows are dropped");
        }

        let mut rows = self.ordered_rows(source)?;
        let mut counts = Vec::with_capacity(plan.num_outputs());
        for path in plan.outputs() {
            let mut out = OutputWriter::create(path, &self.dialect, header)?;
            for row in rows.by_ref().take(quota) {
                out.write_row(&row?)?;
            }
            counts.push(out.finish()?);
        }
        Ok(counts)
    }

    fn round_robin<S>(&self, source: &S, header: Option<&HeaderRow>, plan: &SplitPlan) -> Result<Vec<usize>>
    where
        S: RowSource + ?Sized,
    {
        let rows = self.ordered_rows(source)?;
        let mut outputs = OutputSet::create(plan.outputs(), &self.dialect, header)?;
        let n = outputs.len();
        for (i, row) in rows.enumerate() {
            outputs.write(i % n, &row?)?;
        }
        outputs.finish()
    }

    fn ordered_rows<'a, S>(&self, source: &'a S) -> Result<Rows<'a>>
    where
        S: RowSource + ?Sized,
    {
        if !self.shuffle.is_on() {
            return source.rows();
        }
        let mut buffer = source.rows()?.collect::<Result<Vec<Row>>>()?;
        self.shuffle.apply(&mut buffer);
        Ok(Box::new(buffer.into_iter().map(Ok)))
    }
}

/// Distribute `source` in source order using the default dialect.
///
/// # Errors
/// See [`Distributor::distribute`].
pub fn distribute<S>(source: &S, header: Option<&HeaderRow>, plan: &SplitPlan) -> Result<Vec<usize>>
where
    S: RowSource + ?Sized,
{
    Distributor::default().distribute(source, header, plan)
}
