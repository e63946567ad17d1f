use clap::{Args, Subcommand};
use std::path::PathBuf;

pub mod run;
pub mod trace;

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a prompt stream through every configured eviction policy
    Run(RunArgs),

    /// Build a trace with repeated prompts from an existing trace file
    Trace(TraceArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Byte budget per policy
    #[arg(long, value_name = "BYTES")]
    pub budget: Option<u64>,

    /// Model identifier sent to the endpoint
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the generate endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model call timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Answer with the synthetic model instead of calling the endpoint
    #[arg(long, conflicts_with = "live")]
    pub synthetic: bool,

    /// Call the real endpoint even if synthetic mode is configured
    #[arg(long)]
    pub live: bool,

    /// JSON trace file with `[{"prompt": ...}]` entries
    #[arg(short, long, value_name = "FILE")]
    pub prompts: Option<PathBuf>,

    /// Number of prompts to replay (0 = all)
    #[arg(short = 'n', long)]
    pub num_prompts: Option<usize>,

    /// Directory for the CSV reports
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip writing summary.json
    #[arg(long)]
    pub no_summary: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// Source trace file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the repeated trace
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of distinct prompts taken from the start of the input
    #[arg(long, default_value = "300")]
    pub unique: usize,

    /// Copies of each distinct prompt
    #[arg(long, default_value = "2")]
    pub repeats: usize,

    /// Length of the final trace
    #[arg(long, default_value = "450")]
    pub total: usize,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,
}
