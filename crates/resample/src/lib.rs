//! Jackknife and bootstrap confidence intervals for verification
//! statistics.
//!
//! Any [`verif_metrics::StatFamily`] can be resampled: the engine recomputes
//! the family over index subsets of its pairs and stores bias-corrected and
//! accelerated (BCa) or percentile bounds in each statistic's bootstrap
//! slots.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//!  │  Jackknife    │────▶│  Bootstrap     │────▶│  Interval per     │
//!  │  (BCa only)   │     │  replicates    │     │  stat and alpha   │
//!  └──────────────┘     └────────────────┘     └──────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use verif_metrics::CtsInfo;
//! use verif_resample::{ResampleConfig, ResampleEngine};
//!
//! let mut cts = CtsInfo::new(fthresh, othresh, &[0.05])?;
//! cts.set_pairs(&pairs, &pairs.all_indices())?;
//! let mut engine = ResampleEngine::new(ResampleConfig::new().with_seed(Some(42)))?;
//! engine.compute(&mut cts, &pairs)?;
//! ```

mod config;
mod engine;
mod error;
mod interval;
mod result;
mod sampler;

pub use config::{Method, ResampleConfig};
pub use engine::{ResampleEngine, resample_family};
pub use error::ResampleError;
pub use interval::{compute_bca_interval, compute_perc_interval};
pub use result::{ResampleSummary, StatCounts};
pub use sampler::{IndexSampler, RngSampler};
