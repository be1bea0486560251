//! Tracing setup for the `verif` binary.

use tracing_subscriber::EnvFilter;

/// Library and binary targets whose events are shown.
const TARGETS: &[&str] = &[
    "verif",
    "verif_contable",
    "verif_metrics",
    "verif_resample",
    "verif_stats",
    "verif_thresh",
];

/// Level for a `-v` count: none warn, `-v` info, `-vv` debug, more trace.
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter directive enabling `level` on every workspace target.
fn directive(level: &str) -> String {
    TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber. `RUST_LOG` replaces the `-v` level when
/// set. Events go to stderr so reports on stdout stay machine-readable.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(level(verbosity))));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
