//! Stats command: compute statistic families over a matched-pairs file.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use verif_metrics::{
    CntInfo, CtsInfo, MctsInfo, NbrCntInfo, NbrCtsInfo, NbrPairs, PairData, PctInfo, StatFamily,
};
use verif_resample::ResampleEngine;

use crate::cli::StatsArgs;
use crate::config::VerifConfig;
use crate::convert::{self, Family};

/// Matched pairs as read from JSON.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairsFile {
    pub fcst: Vec<f64>,
    pub obs: Vec<f64>,
    #[serde(default)]
    pub climo_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub climo_stdev: Option<Vec<f64>>,
    #[serde(default)]
    pub weight: Option<Vec<f64>>,
    /// Grid shape when the pairs are a row-major field.
    #[serde(default)]
    pub grid: Option<GridShape>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridShape {
    pub nx: usize,
    pub ny: usize,
}

/// One statistic in the output document. Bound vectors hold one slot per
/// alpha level and are omitted for statistics without bounds.
#[derive(Debug, Serialize)]
pub struct StatRecord {
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ncl: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ncu: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcl: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcu: Vec<Option<f64>>,
}

impl StatRecord {
    fn point(value: Option<f64>) -> Self {
        Self {
            value,
            n: None,
            ncl: Vec::new(),
            ncu: Vec::new(),
            bcl: Vec::new(),
            bcu: Vec::new(),
        }
    }
}

type Report = BTreeMap<&'static str, BTreeMap<&'static str, StatRecord>>;

/// Run the stats pipeline.
pub fn run(args: StatsArgs) -> Result<()> {
    let _cmd = info_span!("stats").entered();

    // 1. Load config
    let config = match &args.config {
        Some(path) => {
            let toml_str = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            toml::from_str(&toml_str).context("failed to parse TOML config")?
        }
        None => toml::from_str::<VerifConfig>("").context("failed to build default config")?,
    };
    let seed = args.seed.or(config.seed);

    // 2. Read pairs
    let input = read_pairs(&args.pairs)?;
    let pairs = build_pairs(&input)?;
    info!(n_pairs = pairs.len(), "pairs loaded");

    // 3. Compute families
    let families = config
        .families
        .iter()
        .map(|s| convert::parse_family(s))
        .collect::<Result<Vec<_>>>()?;
    let mut engine = ResampleEngine::new(convert::build_resample_config(&config.resample, seed)?)
        .context("failed to build resampling engine")?;
    let report = compute_families(&families, &config, &input, &pairs, &mut engine)?;

    // 4. Write output
    let json = serde_json::to_string_pretty(&report).context("failed to serialize output")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write output: {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn read_pairs(path: &Path) -> Result<PairsFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pairs file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse pairs file: {}", path.display()))
}

fn build_pairs(input: &PairsFile) -> Result<PairData> {
    let mut pairs = PairData::new(&input.fcst, &input.obs).context("invalid pairs")?;
    pairs = match (&input.climo_mean, &input.climo_stdev) {
        (Some(mean), Some(stdev)) => pairs.with_climo(mean, stdev)?,
        (Some(mean), None) => pairs.with_climo_mean(mean)?,
        (None, Some(_)) => bail!("climo_stdev given without climo_mean"),
        (None, None) => pairs,
    };
    if let Some(w) = &input.weight {
        pairs = pairs.with_weights(w)?;
    }
    Ok(pairs)
}

fn compute_families(
    families: &[Family],
    config: &VerifConfig,
    input: &PairsFile,
    pairs: &PairData,
    engine: &mut ResampleEngine,
) -> Result<Report> {
    let alpha = &config.alpha;
    let t = &config.thresholds;
    let fthresh = convert::parse_thresh(&t.fcst, "thresholds.fcst")?;
    let othresh = convert::parse_thresh(&t.obs, "thresholds.obs")?;
    let all = pairs.all_indices();
    let mut report = Report::new();

    let mut nbr_pairs: Option<NbrPairs> = None;
    if families.iter().any(|f| f.needs_grid()) {
        let Some(grid) = input.grid else {
            bail!("neighborhood families need a grid shape in the pairs file");
        };
        let built = NbrPairs::from_raw(
            grid.nx,
            grid.ny,
            &input.fcst,
            &input.obs,
            &fthresh,
            &othresh,
            config.nbr.width,
        )
        .context("failed to compute neighborhood coverage")?;
        nbr_pairs = Some(built);
    }

    for &family in families {
        let _fam = info_span!("family", ?family).entered();
        match family {
            Family::Cts => {
                let mut cts = CtsInfo::new(fthresh, othresh, alpha)?;
                cts.set_pairs(pairs, &all)?;
                cts.compute_stats();
                cts.compute_ci();
                finish(&mut cts, pairs, engine, &mut report)?;
            }
            Family::Mcts => {
                let f = convert::parse_thresh_array(&t.mcts_fcst, "thresholds.mcts_fcst")?;
                let o = convert::parse_thresh_array(&t.mcts_obs, "thresholds.mcts_obs")?;
                let mut mcts = MctsInfo::new(f, o, alpha)?;
                mcts.set_pairs(pairs, &all)?;
                mcts.compute_stats()?;
                mcts.compute_ci();
                finish(&mut mcts, pairs, engine, &mut report)?;
            }
            Family::Cnt => {
                let mut cnt = CntInfo::new(alpha)?
                    .with_precip_flag(config.cnt.precip_flag)
                    .with_rank_corr(config.cnt.rank_corr)
                    .with_rank_corr_max(config.cnt.rank_corr_max);
                cnt.set_pairs(pairs, &all)?;
                cnt.compute_stats();
                cnt.compute_ci();
                finish(&mut cnt, pairs, engine, &mut report)?;
            }
            Family::Pct => {
                let mut pct = PctInfo::new(t.prob.clone(), othresh, alpha)?;
                pct.set_pairs(pairs, &all)
                    .context("PCT forecasts must be probabilities in [0, 1]")?;
                pct.compute_stats();
                pct.compute_ci();
                finish(&mut pct, pairs, engine, &mut report)?;
            }
            Family::NbrCts | Family::NbrCnt => {
                let Some(nbr) = nbr_pairs.as_ref() else {
                    bail!("neighborhood coverage was not computed");
                };
                let idx: Vec<usize> = (0..nbr.len()).collect();
                let width = config.nbr.width;
                if family == Family::NbrCts {
                    let cthresh = convert::parse_thresh(&config.nbr.cov_thresh, "nbr.cov_thresh")?;
                    let mut info = NbrCtsInfo::new(fthresh, othresh, cthresh, width, alpha)?;
                    info.set_pairs(nbr, &idx)?;
                    info.compute_stats();
                    info.compute_ci();
                    finish(&mut info, nbr, engine, &mut report)?;
                } else {
                    let mut info = NbrCntInfo::new(fthresh, othresh, width, alpha)?;
                    info.set_pairs(nbr, &idx)?;
                    info.compute_stats();
                    finish(&mut info, nbr, engine, &mut report)?;
                }
            }
        }
    }
    Ok(report)
}

/// Resamples one family and adds its statistics to the report.
fn finish<F: StatFamily>(
    family: &mut F,
    pairs: &F::Pairs,
    engine: &mut ResampleEngine,
    report: &mut Report,
) -> Result<()> {
    let summary = engine
        .compute(family, pairs)
        .with_context(|| format!("bootstrap failed for {}", F::NAME))?;
    info!(
        family = F::NAME,
        n = summary.n_pairs(),
        skipped = summary.is_skipped(),
        "family computed"
    );
    report.insert(F::NAME, family_records(family));
    Ok(())
}

fn family_records<F: StatFamily>(family: &F) -> BTreeMap<&'static str, StatRecord> {
    let mut out = BTreeMap::new();
    out.insert("TOTAL", StatRecord::point(Some(family.total() as f64)));
    for (name, ci) in family.ci_fields() {
        out.insert(
            name,
            StatRecord {
                value: ci.v,
                n: Some(ci.n),
                ncl: ci.v_ncl.clone(),
                ncu: ci.v_ncu.clone(),
                bcl: ci.v_bcl.clone(),
                bcu: ci.v_bcu.clone(),
            },
        );
    }
    for (name, v) in family.extra_stats() {
        out.insert(name, StatRecord::point(v));
    }
    out
}
