//! Pure conversion functions: TOML config strings -> crate API types.

use anyhow::{Context, Result, bail};
use verif_resample::{Method, ResampleConfig};
use verif_thresh::{SingleThresh, ThreshArray};

use crate::config::ResampleToml;

/// Statistic families the `stats` command can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Cts,
    Mcts,
    Cnt,
    Pct,
    NbrCts,
    NbrCnt,
}

impl Family {
    /// Every family, in output order.
    pub const ALL: [Family; 6] = [
        Family::Cts,
        Family::Mcts,
        Family::Cnt,
        Family::Pct,
        Family::NbrCts,
        Family::NbrCnt,
    ];

    /// True for families computed over neighborhood coverage of a grid.
    pub fn needs_grid(self) -> bool {
        matches!(self, Family::NbrCts | Family::NbrCnt)
    }
}

/// Parses a family name string into the corresponding enum variant.
pub fn parse_family(s: &str) -> Result<Family> {
    match s.to_lowercase().as_str() {
        "cts" => Ok(Family::Cts),
        "mcts" => Ok(Family::Mcts),
        "cnt" => Ok(Family::Cnt),
        "pct" => Ok(Family::Pct),
        "nbrcts" => Ok(Family::NbrCts),
        "nbrcnt" => Ok(Family::NbrCnt),
        other => bail!("unknown statistic family: {other:?}"),
    }
}

/// Parses an interval method name string into the corresponding enum variant.
pub fn parse_method(s: &str) -> Result<Method> {
    match s.to_lowercase().as_str() {
        "bca" => Ok(Method::Bca),
        "percentile" | "perc" => Ok(Method::Percentile),
        other => bail!("unknown bootstrap method: {other:?}"),
    }
}

/// Parses a single threshold such as `">=5"`, naming the config key on error.
pub fn parse_thresh(s: &str, key: &str) -> Result<SingleThresh> {
    s.parse()
        .with_context(|| format!("invalid threshold for {key}: {s:?}"))
}

/// Parses a comma-separated threshold list such as `">=1,>=5"`.
pub fn parse_thresh_array(s: &str, key: &str) -> Result<ThreshArray> {
    s.parse()
        .with_context(|| format!("invalid threshold list for {key}: {s:?}"))
}

/// Builds a validated [`ResampleConfig`] from the TOML resample section.
pub fn build_resample_config(t: &ResampleToml, seed: Option<u64>) -> Result<ResampleConfig> {
    let cfg = ResampleConfig::new()
        .with_method(parse_method(&t.method)?)
        .with_n_rep(t.n_rep)
        .with_m_prop(t.m_prop)
        .with_replace(t.replace)
        .with_seed(seed);
    cfg.validate().context("invalid [resample] section")?;
    Ok(cfg)
}
