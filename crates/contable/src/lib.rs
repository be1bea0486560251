//! Contingency tables for categorical forecast verification.
//!
//! Three table shapes share one count store:
//!
//! - [`ContingencyTable`]: general R x C counts, with generalized skill
//!   scores (accuracy, Heidke, Peirce, Gerrity) for square tables.
//! - [`TwoByTwoTable`]: yes/no event table with the standard dichotomous
//!   scores and their confidence intervals.
//! - [`Nx2Table`]: probability bins by event/non-event, for Brier score
//!   decomposition, reliability and ROC analysis.
//!
//! Scores return `Option<f64>`; `None` marks a statistic that is undefined
//! for the counts at hand (usually a zero denominator).
//!
//! ```
//! use verif_contable::TwoByTwoTable;
//!
//! let t = TwoByTwoTable::from_counts(28, 72, 23, 2680);
//! let csi = t.csi().unwrap();
//! assert!((csi - 0.227642).abs() < 1e-6);
//! ```

mod ci;
mod error;
mod multi;
mod nx2;
mod table;
mod two_by_two;

pub use ci::{
    Interval, compute_hk_ci, compute_normal_ci, compute_proportion_ci, compute_wald_ci,
    compute_wilson_ci, compute_woolf_ci,
};
pub use error::ContableError;
pub use multi::gerrity_scoring_matrix;
pub use nx2::Nx2Table;
pub use table::ContingencyTable;
pub use two_by_two::{Cell, TwoByTwoTable};
