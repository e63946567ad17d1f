use clap::Parser;
use semcache::{logging, Commands};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "semcache")]
#[command(about = "Compare eviction policies for a semantic LLM response cache", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(cli.verbose).map_err(|e| eyre::eyre!(e))?;

    cli.command.execute(cli.config.as_deref()).await
}
