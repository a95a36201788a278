use std::path::PathBuf;

/// Fair candidate-to-agent assignment CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "fairshare", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Assign unknown candidates to agents under the coverage floor
    Assign(AssignArgs),

    /// Score candidates against the known-customer profile only
    Score(ScoreArgs),
}

/// Inputs shared by both commands.
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Candidate table (id, label, potential_value, lat, lon, numeric features...)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub candidates: PathBuf,

    /// Known-customer table; overrides the candidate `label` column
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub customers: Option<PathBuf>,

    /// Identifier columns of the customer table (default: all columns)
    #[arg(long = "customer-column")]
    pub customer_columns: Vec<String>,

    /// Table of candidate ids to exclude; requires --customers
    #[arg(long, requires = "customers", value_hint = clap::ValueHint::FilePath)]
    pub excluded: Option<PathBuf>,

    /// Numeric candidate columns that are not features
    #[arg(long = "ignore-column")]
    pub ignore_columns: Vec<String>,

    /// JSON run configuration; flags below override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Seed of the known-customer split
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Agent table (id, lat, lon)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub agents: PathBuf,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Weight motivation by learned affinity
    #[arg(long)]
    pub affinity: bool,

    /// Share of the average per-agent motivation every agent must reach
    #[arg(long)]
    pub coverage: Option<f64>,

    /// Relative optimality gap the solver may stop at
    #[arg(long)]
    pub gap: Option<f64>,

    /// Solver time limit in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Keep fractional kilometres as travel cost
    #[arg(long)]
    pub exact_distances: bool,
}

#[derive(clap::Args, Debug)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output scores file, defaults to "./scores.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
