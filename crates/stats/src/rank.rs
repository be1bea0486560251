//! Average ranks and pairwise concordance for rank correlations.

use crate::is_eq;

/// Ranks of an array with ties resolved to their average rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedArray {
    ranks: Vec<f64>,
    ties: usize,
}

impl RankedArray {
    /// 1-based ranks in the order of the input values.
    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    /// Number of groups of tied values.
    pub fn ties(&self) -> usize {
        self.ties
    }
}

/// Ranks `values` from 1 to n, assigning tied values the mean of the ranks
/// they span.
pub fn average_ranks(values: &[f64]) -> RankedArray {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut ties = 0;
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && is_eq(values[order[end]], values[order[start]]) {
            end += 1;
        }
        if end - start > 1 {
            ties += 1;
        }
        // Positions start..end hold ranks start+1..=end.
        let avg = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        start = end;
    }

    RankedArray { ranks, ties }
}

/// Pairwise agreement counts between two rankings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Concordance {
    /// Pairs ordered the same way in both rankings.
    pub concordant: u64,
    /// Pairs ordered oppositely.
    pub discordant: u64,
    /// Pairs tied in the second ranking only.
    pub extra_f: u64,
    /// Pairs tied in the first ranking only.
    pub extra_o: u64,
}

impl Concordance {
    /// Kendall's tau-b. `None` when every pair is tied.
    pub fn kendall_tau(&self) -> Option<f64> {
        let base = (self.concordant + self.discordant) as f64;
        let den = (base + self.extra_f as f64).sqrt() * (base + self.extra_o as f64).sqrt();
        if is_eq(den, 0.0) {
            return None;
        }
        Some((self.concordant as f64 - self.discordant as f64) / den)
    }
}

/// Counts concordant, discordant and singly-tied pairs. O(n²).
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn concordance(f: &[f64], o: &[f64]) -> Concordance {
    assert_eq!(f.len(), o.len(), "concordance: length mismatch");
    let mut c = Concordance::default();
    for i in 0..f.len() {
        for j in (i + 1)..f.len() {
            let f_tie = is_eq(f[i], f[j]);
            let o_tie = is_eq(o[i], o[j]);
            match (f_tie, o_tie) {
                (true, true) => {}
                (true, false) => c.extra_o += 1,
                (false, true) => c.extra_f += 1,
                (false, false) => {
                    if (f[i] < f[j]) == (o[i] < o[j]) {
                        c.concordant += 1;
                    } else {
                        c.discordant += 1;
                    }
                }
            }
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ranks_without_ties() {
        let r = average_ranks(&[30.0, 10.0, 20.0]);
        assert_eq!(r.ranks(), &[3.0, 1.0, 2.0]);
        assert_eq!(r.ties(), 0);
    }

    #[test]
    fn ranks_with_ties() {
        // sorted: 1, 2, 2, 5 -> ranks 1, 2.5, 2.5, 4
        let r = average_ranks(&[2.0, 5.0, 1.0, 2.0]);
        assert_eq!(r.ranks(), &[2.5, 4.0, 1.0, 2.5]);
        assert_eq!(r.ties(), 1);
    }

    #[test]
    fn ranks_empty() {
        let r = average_ranks(&[]);
        assert!(r.ranks().is_empty());
        assert_eq!(r.ties(), 0);
    }

    #[test]
    fn kendall_perfect_agreement() {
        let c = concordance(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(c.concordant, 6);
        assert_eq!(c.discordant, 0);
        assert_relative_eq!(c.kendall_tau().unwrap(), 1.0);
    }

    #[test]
    fn kendall_reversed() {
        let c = concordance(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        assert_relative_eq!(c.kendall_tau().unwrap(), -1.0);
    }

    #[test]
    fn kendall_with_ties() {
        // pairs: (0,1) f tie -> extra_o; (0,2) conc; (1,2) conc
        let c = concordance(&[1.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(c.extra_o, 1);
        assert_eq!(c.concordant, 2);
        // 2 / (sqrt(2) * sqrt(3))
        assert_relative_eq!(c.kendall_tau().unwrap(), 2.0 / 6.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn kendall_all_tied_is_none() {
        let c = concordance(&[1.0, 1.0], &[2.0, 2.0]);
        assert!(c.kendall_tau().is_none());
    }
}
