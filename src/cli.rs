use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Forecast verification statistics with bootstrap confidence intervals.
#[derive(Parser)]
#[command(
    name = "verif",
    version,
    about = "Forecast verification statistics with bootstrap confidence intervals"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Compute statistic families over a matched-pairs file.
    Stats(StatsArgs),
    /// Print the statistic names each family defines.
    ListStats,
}

/// Arguments for the `stats` subcommand.
#[derive(clap::Args)]
pub struct StatsArgs {
    /// Path to the matched-pairs JSON file.
    #[arg(short, long)]
    pub pairs: PathBuf,

    /// Path to TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output JSON path. Writes to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}
