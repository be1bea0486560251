//! Scalar partial sums (SL1L2 and the anomaly variant SAL1L2).

use std::ops::AddAssign;

use serde::Serialize;

use crate::error::MetricsError;
use crate::pairs::PairData;

/// Weighted means of f, o, f·o, f², o² and |f-o|, plus the same quantities
/// for anomalies from the climatological mean.
///
/// Means are only meaningful when the matching count is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Sl1l2Info {
    /// Pairs behind the plain sums.
    pub scount: u64,
    /// Mean forecast.
    pub fbar: f64,
    /// Mean observation.
    pub obar: f64,
    /// Mean of f·o.
    pub fobar: f64,
    /// Mean of f².
    pub ffbar: f64,
    /// Mean of o².
    pub oobar: f64,
    /// Mean absolute error.
    pub smae: f64,

    /// Pairs behind the anomaly sums.
    pub sacount: u64,
    /// Mean forecast anomaly.
    pub fabar: f64,
    /// Mean observation anomaly.
    pub oabar: f64,
    /// Mean of the anomaly product.
    pub foabar: f64,
    /// Mean squared forecast anomaly.
    pub ffabar: f64,
    /// Mean squared observation anomaly.
    pub ooabar: f64,
    /// Mean absolute anomaly error.
    pub samae: f64,
}

impl Sl1l2Info {
    /// Computes the sums over the pairs at `indices`.
    ///
    /// Anomaly sums are filled only when the pairs carry climatological means.
    pub fn from_pairs(pairs: &PairData, indices: &[usize]) -> Result<Self, MetricsError> {
        pairs.check_indices(indices)?;
        let mut s = Self::default();
        if indices.is_empty() {
            return Ok(s);
        }
        let (f, o) = (pairs.fcst(), pairs.obs());
        let weights = pairs.normalized_weights(indices);
        for (&j, &w) in indices.iter().zip(&weights) {
            let (fj, oj) = (f[j], o[j]);
            s.fbar += w * fj;
            s.obar += w * oj;
            s.fobar += w * fj * oj;
            s.ffbar += w * fj * fj;
            s.oobar += w * oj * oj;
            s.smae += w * (fj - oj).abs();

            if let Some(c) = pairs.climo_mean(j) {
                let (fa, oa) = (fj - c, oj - c);
                s.fabar += w * fa;
                s.oabar += w * oa;
                s.foabar += w * fa * oa;
                s.ffabar += w * fa * fa;
                s.ooabar += w * oa * oa;
                s.samae += w * (fa - oa).abs();
                s.sacount += 1;
            }
        }
        s.scount = indices.len() as u64;
        Ok(s)
    }

    /// Zeros every sum and count.
    pub fn zero_out(&mut self) {
        *self = Self::default();
    }
}

impl AddAssign<&Sl1l2Info> for Sl1l2Info {
    /// Count-weighted merge of two sets of sums.
    fn add_assign(&mut self, c: &Sl1l2Info) {
        let merge = |a: f64, na: u64, b: f64, nb: u64| {
            (a * na as f64 + b * nb as f64) / (na + nb) as f64
        };

        let (na, nb) = (self.scount, c.scount);
        if na + nb > 0 {
            self.fbar = merge(self.fbar, na, c.fbar, nb);
            self.obar = merge(self.obar, na, c.obar, nb);
            self.fobar = merge(self.fobar, na, c.fobar, nb);
            self.ffbar = merge(self.ffbar, na, c.ffbar, nb);
            self.oobar = merge(self.oobar, na, c.oobar, nb);
            self.smae = merge(self.smae, na, c.smae, nb);
        }
        self.scount = na + nb;

        let (na, nb) = (self.sacount, c.sacount);
        if na + nb > 0 {
            self.fabar = merge(self.fabar, na, c.fabar, nb);
            self.oabar = merge(self.oabar, na, c.oabar, nb);
            self.foabar = merge(self.foabar, na, c.foabar, nb);
            self.ffabar = merge(self.ffabar, na, c.ffabar, nb);
            self.ooabar = merge(self.ooabar, na, c.ooabar, nb);
            self.samae = merge(self.samae, na, c.samae, nb);
        }
        self.sacount = na + nb;
    }
}
