//! List-stats command: print the statistic names each family defines.

use anyhow::Result;
use verif_metrics::{CntInfo, CtsInfo, MctsInfo, NbrCntInfo, NbrCtsInfo, PctInfo, StatFamily};

use crate::config::VerifConfig;
use crate::convert::{self, Family};

/// Prints one line per family: its name followed by its statistic names.
pub fn run() -> Result<()> {
    for line in stat_lines()? {
        println!("{line}");
    }
    Ok(())
}

fn stat_lines() -> Result<Vec<String>> {
    let config: VerifConfig = toml::from_str("")?;
    let t = &config.thresholds;
    let alpha = &config.alpha;
    let f = convert::parse_thresh(&t.fcst, "thresholds.fcst")?;
    let o = convert::parse_thresh(&t.obs, "thresholds.obs")?;
    let c = convert::parse_thresh(&config.nbr.cov_thresh, "nbr.cov_thresh")?;
    let width = config.nbr.width;

    Family::ALL
        .iter()
        .map(|family| -> Result<String> {
            Ok(match family {
                Family::Cts => line(&CtsInfo::new(f, o, alpha)?),
                Family::Mcts => {
                    let fa = convert::parse_thresh_array(&t.mcts_fcst, "thresholds.mcts_fcst")?;
                    let oa = convert::parse_thresh_array(&t.mcts_obs, "thresholds.mcts_obs")?;
                    line(&MctsInfo::new(fa, oa, alpha)?)
                }
                Family::Cnt => line(&CntInfo::new(alpha)?),
                Family::Pct => line(&PctInfo::new(t.prob.clone(), o, alpha)?),
                Family::NbrCts => line(&NbrCtsInfo::new(f, o, c, width, alpha)?),
                Family::NbrCnt => line(&NbrCntInfo::new(f, o, width, alpha)?),
            })
        })
        .collect()
}

fn line<F: StatFamily>(family: &F) -> String {
    format!("{}: {}", F::NAME, family.stat_names().join(" "))
}
