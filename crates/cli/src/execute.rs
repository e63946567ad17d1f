use crate::commands::{run, trace, Commands};
use semcache_config::BenchConfigLoader;
use std::path::Path;

impl Commands {
    pub async fn execute(self, config_path: Option<&Path>) -> eyre::Result<()> {
        match self {
            Commands::Run(args) => {
                let config = BenchConfigLoader::load(config_path)?;
                let config = BenchConfigLoader::apply_cli_args(config, &args.overrides());
                run::execute(config, !args.no_summary).await
            }
            Commands::Trace(args) => trace::execute(args),
        }
    }
}
