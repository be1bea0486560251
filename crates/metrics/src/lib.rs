//! Forecast verification statistic families.
//!
//! Each family accumulates matched pairs (or partial sums), derives point
//! statistics with `compute_stats` and normal-approximation bounds with
//! `compute_ci`. Every family implements [`StatFamily`], which exposes its
//! statistics by canonical name and lets a resampling engine recompute it
//! over index subsets.
//!
//! | Family | Type | Input |
//! |--------|------|-------|
//! | CTS | [`CtsInfo`] | pairs thresholded to yes/no |
//! | MCTS | [`MctsInfo`] | pairs binned into categories |
//! | CNT | [`CntInfo`] | continuous pairs or [`Sl1l2Info`] sums |
//! | PCT | [`PctInfo`] | probability forecasts against an event |
//! | NBRCTS | [`NbrCtsInfo`] | thresholded fractional coverage |
//! | NBRCNT | [`NbrCntInfo`] | fractional coverage |
//! | MEAN_STDEV | [`MeanStdev`] | a single series |
//!
//! ```
//! use verif_metrics::{CtsInfo, PairData, StatFamily};
//!
//! let pairs = PairData::new(&[0.0, 2.0, 3.0, 0.5], &[1.5, 0.0, 4.0, 0.1])?;
//! let mut cts = CtsInfo::new(">=1".parse()?, ">=1".parse()?, &[0.05])?;
//! cts.set_pairs(&pairs, &pairs.all_indices())?;
//! cts.compute_stats();
//! assert_eq!(cts.get_stat("PODY")?, Some(0.5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ci_info;
mod cnt;
mod cts;
mod error;
mod family;
mod mcts;
mod mean_stdev;
mod nbr;
mod pairs;
mod pct;
mod sl1l2;

pub use ci_info::CiInfo;
pub use cnt::{CntInfo, DEFAULT_RANK_CORR_MAX};
pub use cts::CtsInfo;
pub use error::MetricsError;
pub use family::StatFamily;
pub use mcts::MctsInfo;
pub use mean_stdev::MeanStdev;
pub use nbr::{NbrCntInfo, NbrCtsInfo, NbrPairs};
pub use pairs::PairData;
pub use pct::{PctInfo, climo_probability};
pub use sl1l2::Sl1l2Info;
pub use verif_contable::Interval;
