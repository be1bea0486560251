//! Skill scores for square multi-category tables.
//!
//! References: Wilks, *Statistical Methods in the Atmospheric Sciences*
//! (eqs. 7.11 and 7.13) and Jolliffe & Stephenson, *Forecast Verification*
//! (Gerrity score, pp. 84-91).

use tracing::warn;
use verif_stats::is_eq;

use crate::error::ContableError;
use crate::table::ContingencyTable;

impl ContingencyTable {
    /// Proportion of counts on the diagonal.
    pub fn gaccuracy(&self) -> Result<Option<f64>, ContableError> {
        self.require_square("gaccuracy")?;
        let n = self.total();
        if n == 0 {
            return Ok(None);
        }
        let diag: u64 = (0..self.rows()).map(|i| self.at(i, i)).sum();
        Ok(Some(diag as f64 / n as f64))
    }

    /// Diagonal proportion and chance agreement `Σ(row·col)/N²`.
    fn agreement_terms(&self) -> Option<(f64, f64)> {
        let n = self.total();
        if n == 0 {
            return None;
        }
        let dn = n as f64;
        let diag: f64 = (0..self.rows()).map(|i| self.at(i, i) as f64 / dn).sum();
        let chance: f64 = (0..self.rows())
            .map(|i| (self.row_sum(i) as f64 / dn) * (self.col_sum(i) as f64 / dn))
            .sum();
        Some((diag, chance))
    }

    /// Generalized Heidke skill score.
    ///
    /// `None` for an empty table or a zero denominator.
    pub fn gheidke(&self) -> Result<Option<f64>, ContableError> {
        self.require_square("gheidke")?;
        Ok(self.agreement_terms().and_then(|(diag, chance)| {
            let den = 1.0 - chance;
            (!is_eq(den, 0.0)).then(|| (diag - chance) / den)
        }))
    }

    /// Generalized Hanssen-Kuipers (Peirce) skill score.
    pub fn gkuiper(&self) -> Result<Option<f64>, ContableError> {
        self.require_square("gkuiper")?;
        Ok(self.agreement_terms().and_then(|(diag, chance)| {
            let dn = self.total() as f64;
            let obs_sq: f64 = (0..self.cols())
                .map(|j| {
                    let p = self.col_sum(j) as f64 / dn;
                    p * p
                })
                .sum();
            let den = 1.0 - obs_sq;
            (!is_eq(den, 0.0)).then(|| (diag - chance) / den)
        }))
    }

    /// Gerrity score: counts weighted by an equitable scoring matrix built
    /// from the observed category frequencies.
    ///
    /// `None` when the table is empty, the first observed category never
    /// occurs, or the scoring matrix has a zero-size denominator.
    pub fn gerrity(&self) -> Result<Option<f64>, ContableError> {
        self.require_square("gerrity")?;
        let n = self.total();
        if n == 0 || self.col_sum(0) == 0 {
            return Ok(None);
        }
        let dn = n as f64;
        let k = self.rows();
        let p: Vec<f64> = (0..k).map(|j| self.col_sum(j) as f64 / dn).collect();
        let s = gerrity_scoring_matrix(&p);

        let mut sum = 0.0;
        for j in 0..k {
            for m in 0..k {
                sum += s[j * k + m] * self.at(j, m) as f64 / dn;
            }
        }
        if !sum.is_finite() {
            warn!(
                n_categories = k,
                "gerrity scoring matrix undefined; an observed category is empty"
            );
            return Ok(None);
        }
        Ok(Some(sum))
    }
}

/// Symmetric `k` x `k` Gerrity scoring matrix for category frequencies `p`.
pub fn gerrity_scoring_matrix(p: &[f64]) -> Vec<f64> {
    let k = p.len();
    let b = 1.0 / (k as f64 - 1.0);

    // a[j] = (1 - cum_p) / cum_p
    let mut cum = 0.0;
    let a: Vec<f64> = p
        .iter()
        .map(|&pj| {
            cum += pj;
            (1.0 - cum) / cum
        })
        .collect();

    // recip_sum[j] = sum of 1/a[i] for i < j
    let mut recip_sum = vec![0.0; k];
    for j in 1..k {
        recip_sum[j] = recip_sum[j - 1] + 1.0 / a[j - 1];
    }

    // direct_sum[j] = sum of a[i] for j <= i <= k-2
    let mut direct_sum = vec![0.0; k];
    for j in (0..k.saturating_sub(1)).rev() {
        direct_sum[j] = direct_sum[j + 1] + a[j];
    }

    let mut s = vec![0.0; k * k];
    for j in 0..k {
        for m in j..k {
            let t = b * (recip_sum[j] - (m - j) as f64 + direct_sum[m]);
            s[j * k + m] = t;
            s[m * k + j] = t;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn from_rows(rows: &[&[u64]]) -> ContingencyTable {
        let mut t = ContingencyTable::new(rows.len(), rows[0].len()).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                t.set_entry(r, c, v).unwrap();
            }
        }
        t
    }

    #[test]
    fn perfect_diagonal_scores_one() {
        let t = from_rows(&[&[10, 0, 0], &[0, 5, 0], &[0, 0, 7]]);
        assert_relative_eq!(t.gaccuracy().unwrap().unwrap(), 1.0);
        assert_relative_eq!(t.gheidke().unwrap().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t.gkuiper().unwrap().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t.gerrity().unwrap().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn two_category_heidke_matches_2x2_formula() {
        // Finley: a=28, b=72, c=23, d=2680
        let t = from_rows(&[&[28, 72], &[23, 2680]]);
        let tt = t.condition_on(0).unwrap();
        assert_relative_eq!(
            t.gheidke().unwrap().unwrap(),
            tt.hss().unwrap(),
            epsilon = 1e-12
        );
        assert_relative_eq!(t.gkuiper().unwrap().unwrap(), tt.hk().unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn two_category_gerrity_equals_peirce() {
        // For two categories the Gerrity score reduces to HK.
        let t = from_rows(&[&[28, 72], &[23, 2680]]);
        let tt = t.condition_on(0).unwrap();
        assert_relative_eq!(t.gerrity().unwrap().unwrap(), tt.hk().unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn gerrity_first_column_empty_is_none() {
        let t = from_rows(&[&[0, 3], &[0, 4]]);
        assert_eq!(t.gerrity().unwrap(), None);
    }

    #[test]
    fn gerrity_later_categories_empty_is_none() {
        // Only the first category observed: a[j] = 0 for every j, so the
        // later scoring weights are infinite.
        let t = from_rows(&[&[4, 0, 0], &[1, 0, 0], &[2, 0, 0]]);
        assert_eq!(t.gerrity().unwrap(), None);
    }

    #[test]
    fn empty_table_scores_are_none() {
        let t = ContingencyTable::square(3).unwrap();
        assert_eq!(t.gaccuracy().unwrap(), None);
        assert_eq!(t.gheidke().unwrap(), None);
        assert_eq!(t.gkuiper().unwrap(), None);
        assert_eq!(t.gerrity().unwrap(), None);
    }

    #[test]
    fn non_square_is_an_error() {
        let t = ContingencyTable::new(3, 2).unwrap();
        assert!(matches!(t.gheidke(), Err(ContableError::NotSquare { op: "gheidke", .. })));
        assert!(t.gerrity().is_err());
    }

    #[test]
    fn scoring_matrix_is_symmetric() {
        let s = gerrity_scoring_matrix(&[0.2, 0.5, 0.3]);
        for j in 0..3 {
            for m in 0..3 {
                assert_relative_eq!(s[j * 3 + m], s[m * 3 + j]);
            }
        }
    }
}
