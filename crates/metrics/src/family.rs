//! The interface the resampling engine drives every statistic family through.

use crate::ci_info::CiInfo;
use crate::error::MetricsError;

/// A named batch of statistics derived from a set of pairs.
///
/// `ci_fields` is the family's tagged accessor list: every statistic that
/// carries confidence bounds, by canonical name. The resampling engine
/// recomputes a family over index subsets with [`StatFamily::replicate`]
/// and reads and writes statistics only through that list.
pub trait StatFamily: Sized + Send + Sync {
    /// Input the family is computed from.
    type Pairs: ?Sized + Sync;

    /// Family name, e.g. `"CTS"`.
    const NAME: &'static str;

    /// Number of pairs in `pairs`.
    fn n_pairs(pairs: &Self::Pairs) -> usize;

    /// Alpha levels of the confidence bounds.
    fn alpha(&self) -> &[f64];

    /// Sample count behind the statistics.
    fn total(&self) -> u64;

    /// Statistics with confidence bounds, by canonical upper-case name.
    fn ci_fields(&self) -> Vec<(&'static str, &CiInfo)>;

    /// Mutable view of [`StatFamily::ci_fields`], in the same order.
    fn ci_fields_mut(&mut self) -> Vec<(&'static str, &mut CiInfo)>;

    /// Point statistics without bounds (counts, diagnostics).
    fn extra_stats(&self) -> Vec<(&'static str, Option<f64>)> {
        Vec::new()
    }

    /// Builds a fresh copy of this family, same thresholds and options,
    /// with point statistics computed from the pairs at `indices` only.
    fn replicate(&self, pairs: &Self::Pairs, indices: &[usize]) -> Result<Self, MetricsError>;

    /// Looks up a statistic by name, case-insensitively. `TOTAL` is always
    /// present.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::UnknownStat`] for a name this family does
    /// not define.
    fn get_stat(&self, name: &str) -> Result<Option<f64>, MetricsError> {
        let key = name.trim().to_ascii_uppercase();
        if key == "TOTAL" {
            return Ok(Some(self.total() as f64));
        }
        if let Some((_, ci)) = self.ci_fields().into_iter().find(|(n, _)| *n == key) {
            return Ok(ci.v);
        }
        if let Some((_, v)) = self.extra_stats().into_iter().find(|(n, _)| *n == key) {
            return Ok(v);
        }
        Err(MetricsError::UnknownStat {
            family: Self::NAME,
            name: name.to_string(),
        })
    }

    /// Every name [`StatFamily::get_stat`] accepts, `TOTAL` first.
    fn stat_names(&self) -> Vec<&'static str> {
        let mut names = vec!["TOTAL"];
        names.extend(self.ci_fields().into_iter().map(|(n, _)| n));
        names.extend(self.extra_stats().into_iter().map(|(n, _)| n));
        names
    }

    /// Point values of [`StatFamily::ci_fields`], in order.
    fn ci_values(&self) -> Vec<Option<f64>> {
        self.ci_fields().into_iter().map(|(_, ci)| ci.v).collect()
    }
}

/// Implements `ci_fields` and `ci_fields_mut` from one `"NAME" => field`
/// list.
macro_rules! ci_fields {
    ($($name:literal => $field:ident),+ $(,)?) => {
        fn ci_fields(&self) -> Vec<(&'static str, &$crate::CiInfo)> {
            vec![$(($name, &self.$field)),+]
        }

        fn ci_fields_mut(&mut self) -> Vec<(&'static str, &mut $crate::CiInfo)> {
            vec![$(($name, &mut self.$field)),+]
        }
    };
}

pub(crate) use ci_fields;
