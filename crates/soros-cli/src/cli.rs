use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use soros_types::Percent;

#[derive(Parser)]
#[command(
    name = "soros",
    about = "Soros journal: progressive-stake simulation and ledger reconciliation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log engine and ledger activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Simulation configuration (TOML); defaults apply when omitted
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the level ladder the configuration builds
    Ladder(LadderArgs),
    /// Play outcomes through a live engine and print the reconciled trail
    Simulate(SimulateArgs),
    /// Reconcile exported outcome records into a balance trail
    Replay(RecordsArgs),
    /// Check exported outcome records for inconsistencies
    Validate(RecordsArgs),
}

#[derive(Args)]
pub struct LadderArgs {
    /// Override the configured payout percentage
    #[arg(long)]
    pub payout: Option<Percent>,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Outcome sequence such as "WWLW" (W = win, L = loss)
    #[arg(short, long, required_unless_present = "random", conflicts_with = "random")]
    pub outcomes: Option<String>,

    /// Play this many coin-flip outcomes instead
    #[arg(long, value_name = "COUNT")]
    pub random: Option<usize>,

    /// Seed for --random
    #[arg(long, requires = "random")]
    pub seed: Option<u64>,

    /// Journal owner the lineage is derived for
    #[arg(long, default_value = "cli")]
    pub owner: String,
}

#[derive(Args)]
pub struct RecordsArgs {
    /// JSON array of outcome records
    #[arg(short, long, value_name = "FILE")]
    pub records: PathBuf,
}
