//! Configuration loading with precedence handling

use crate::config::{BenchConfig, ConfigSource};
use semcache_core::{
    Error, Result, SEMCACHE_BYTE_BUDGET_VAR, SEMCACHE_ENDPOINT_VAR, SEMCACHE_MODEL_VAR,
    SEMCACHE_OUTPUT_DIR_VAR, SEMCACHE_PROMPTS_VAR, SEMCACHE_SYNTHETIC_VAR,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Values given on the command line; `None` leaves the lower layer alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub byte_budget: Option<u64>,
    pub model_name: Option<String>,
    pub endpoint: Option<String>,
    pub model_timeout_secs: Option<u64>,
    pub synthetic: Option<bool>,
    pub prompt_file: Option<PathBuf>,
    pub number_of_prompts: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

impl CliOverrides {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Configuration loader that handles precedence
pub struct BenchConfigLoader;

impl BenchConfigLoader {
    /// Defaults, then the config file, then the environment.
    ///
    /// An explicitly named file must exist. The default location is only
    /// read when present.
    pub fn load(explicit: Option<&Path>) -> Result<BenchConfig> {
        let mut config = BenchConfig::default();

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::configuration(format!(
                        "config file '{}' does not exist",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => Self::default_config_path().filter(|path| path.exists()),
        };

        if let Some(path) = path {
            config = Self::load_from_file(&path)?;
            config.source = ConfigSource::ConfigFile(path);
        }

        Self::apply_env(&mut config)?;
        Ok(config)
    }

    /// Read a JSON config file; absent fields keep their defaults
    pub fn load_from_file(path: &Path) -> Result<BenchConfig> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::file_system(path, "read", e))?;
        let config: BenchConfig = serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!("invalid config file '{}': {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/semcache/config.json`, else the platform config dir
    pub fn default_config_path() -> Option<PathBuf> {
        let config_dir = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()?,
        };
        Some(config_dir.join("semcache").join("config.json"))
    }

    fn apply_env(config: &mut BenchConfig) -> Result<()> {
        let mut applied = Vec::new();

        if let Some(budget) = env_parse::<u64>(SEMCACHE_BYTE_BUDGET_VAR)? {
            config.byte_budget = budget;
            applied.push(SEMCACHE_BYTE_BUDGET_VAR);
        }
        if let Some(model) = env_string(SEMCACHE_MODEL_VAR) {
            config.model_name = model;
            applied.push(SEMCACHE_MODEL_VAR);
        }
        if let Some(endpoint) = env_string(SEMCACHE_ENDPOINT_VAR) {
            config.endpoint = endpoint;
            applied.push(SEMCACHE_ENDPOINT_VAR);
        }
        if let Some(raw) = env_string(SEMCACHE_SYNTHETIC_VAR) {
            config.synthetic.enabled = parse_bool(SEMCACHE_SYNTHETIC_VAR, &raw)?;
            applied.push(SEMCACHE_SYNTHETIC_VAR);
        }
        if let Some(prompts) = env_string(SEMCACHE_PROMPTS_VAR) {
            config.prompt_file = PathBuf::from(prompts);
            applied.push(SEMCACHE_PROMPTS_VAR);
        }
        if let Some(dir) = env_string(SEMCACHE_OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(dir);
            applied.push(SEMCACHE_OUTPUT_DIR_VAR);
        }

        if !applied.is_empty() {
            debug!(vars = ?applied, "applied environment overrides");
            config.source = ConfigSource::EnvironmentVariable(applied.join(","));
        }
        Ok(())
    }

    /// Apply command line arguments (highest precedence)
    pub fn apply_cli_args(mut config: BenchConfig, overrides: &CliOverrides) -> BenchConfig {
        if overrides.is_empty() {
            return config;
        }

        if let Some(budget) = overrides.byte_budget {
            config.byte_budget = budget;
        }
        if let Some(model) = &overrides.model_name {
            config.model_name = model.clone();
        }
        if let Some(endpoint) = &overrides.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(timeout) = overrides.model_timeout_secs {
            config.model_timeout_secs = timeout;
        }
        if let Some(synthetic) = overrides.synthetic {
            config.synthetic.enabled = synthetic;
        }
        if let Some(prompts) = &overrides.prompt_file {
            config.prompt_file = prompts.clone();
        }
        if let Some(n) = overrides.number_of_prompts {
            config.number_of_prompts = n;
        }
        if let Some(dir) = &overrides.output_dir {
            config.output_dir = dir.clone();
        }

        config.source = ConfigSource::CommandLine;
        config
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::configuration(format!("invalid {name}='{raw}': {e}")))
        })
        .transpose()
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!(
            "invalid {name}='{raw}': expected true or false"
        ))),
    }
}
