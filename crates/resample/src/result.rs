//! Output type for resampling runs.

/// Valid replicate counts behind one statistic's bootstrap bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatCounts {
    /// Canonical statistic name.
    pub name: &'static str,
    /// Jackknife values that were defined (zero for the percentile method).
    pub n_jack: usize,
    /// Bootstrap replicates that were defined.
    pub n_boot: usize,
}

/// Summary of one family's resampling run.
#[derive(Debug, Clone)]
pub struct ResampleSummary {
    family: &'static str,
    n_pairs: usize,
    n_rep: usize,
    skipped: bool,
    stats: Vec<StatCounts>,
}

impl ResampleSummary {
    pub(crate) fn new(
        family: &'static str,
        n_pairs: usize,
        n_rep: usize,
        stats: Vec<StatCounts>,
    ) -> Self {
        Self {
            family,
            n_pairs,
            n_rep,
            skipped: false,
            stats,
        }
    }

    pub(crate) fn skipped(family: &'static str, n_pairs: usize) -> Self {
        Self {
            family,
            n_pairs,
            n_rep: 0,
            skipped: true,
            stats: Vec::new(),
        }
    }

    /// Returns the family name.
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Returns the number of pairs resampled.
    pub fn n_pairs(&self) -> usize {
        self.n_pairs
    }

    /// Returns the number of replicates drawn.
    pub fn n_rep(&self) -> usize {
        self.n_rep
    }

    /// True when there were too few pairs or replicates to resample.
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Returns the per-statistic replicate counts, in family order.
    pub fn stats(&self) -> &[StatCounts] {
        &self.stats
    }

    /// Looks up one statistic's counts by canonical name.
    pub fn stat(&self, name: &str) -> Option<&StatCounts> {
        self.stats.iter().find(|s| s.name == name)
    }
}
