use serde::Deserialize;

/// Top-level run configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Alpha levels for every confidence interval.
    #[serde(default = "default_alpha")]
    pub alpha: Vec<f64>,

    /// Families to compute, by name (`cts`, `mcts`, `cnt`, `pct`,
    /// `nbrcts`, `nbrcnt`).
    #[serde(default = "default_families")]
    pub families: Vec<String>,

    /// Event thresholds.
    #[serde(default)]
    pub thresholds: ThresholdToml,

    /// Continuous statistics settings.
    #[serde(default)]
    pub cnt: CntToml,

    /// Neighborhood settings.
    #[serde(default)]
    pub nbr: NbrToml,

    /// Bootstrap settings.
    #[serde(default)]
    pub resample: ResampleToml,
}

fn default_alpha() -> Vec<f64> {
    vec![0.05]
}
fn default_families() -> Vec<String> {
    vec!["cts".to_string(), "cnt".to_string()]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdToml {
    #[serde(default = "default_event")]
    pub fcst: String,
    #[serde(default = "default_event")]
    pub obs: String,
    #[serde(default = "default_categories")]
    pub mcts_fcst: String,
    #[serde(default = "default_categories")]
    pub mcts_obs: String,
    #[serde(default = "default_prob")]
    pub prob: Vec<f64>,
}

impl Default for ThresholdToml {
    fn default() -> Self {
        Self {
            fcst: default_event(),
            obs: default_event(),
            mcts_fcst: default_categories(),
            mcts_obs: default_categories(),
            prob: default_prob(),
        }
    }
}

fn default_event() -> String {
    ">0".to_string()
}
fn default_categories() -> String {
    ">=1,>=5".to_string()
}
fn default_prob() -> Vec<f64> {
    vec![0.0, 0.25, 0.5, 0.75, 1.0]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CntToml {
    #[serde(default)]
    pub precip_flag: bool,
    #[serde(default = "default_true")]
    pub rank_corr: bool,
    #[serde(default = "default_rank_corr_max")]
    pub rank_corr_max: usize,
}

impl Default for CntToml {
    fn default() -> Self {
        Self {
            precip_flag: false,
            rank_corr: true,
            rank_corr_max: default_rank_corr_max(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_rank_corr_max() -> usize {
    verif_metrics::DEFAULT_RANK_CORR_MAX
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NbrToml {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_cov_thresh")]
    pub cov_thresh: String,
}

impl Default for NbrToml {
    fn default() -> Self {
        Self {
            width: default_width(),
            cov_thresh: default_cov_thresh(),
        }
    }
}

fn default_width() -> usize {
    3
}
fn default_cov_thresh() -> String {
    ">=0.5".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResampleToml {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_n_rep")]
    pub n_rep: usize,
    #[serde(default = "default_m_prop")]
    pub m_prop: f64,
    #[serde(default = "default_true")]
    pub replace: bool,
}

impl Default for ResampleToml {
    fn default() -> Self {
        Self {
            method: default_method(),
            n_rep: default_n_rep(),
            m_prop: default_m_prop(),
            replace: true,
        }
    }
}

fn default_method() -> String {
    "bca".to_string()
}
fn default_n_rep() -> usize {
    1000
}
fn default_m_prop() -> f64 {
    1.0
}
