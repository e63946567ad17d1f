//! Benchmark configuration types and validation

use semcache_core::{
    Error, Result, DEFAULT_BYTE_BUDGET, DEFAULT_ENDPOINT, DEFAULT_MODEL_NAME,
    DEFAULT_MODEL_TIMEOUT_SECS, DEFAULT_NUMBER_OF_PROMPTS, DEFAULT_PROMPT_FILE,
    DEFAULT_SIMILARITY_MAX_DISTANCE, DEFAULT_SYNTHETIC_LATENCY_MS, DEFAULT_SYNTHETIC_SIZES,
    DEFAULT_SYNTHETIC_SLEEP_MS,
};
use semcache_eviction::PolicyKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

/// Where the final value of a configuration came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Built-in defaults
    #[default]
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
    /// Command line argument
    CommandLine,
}

/// One policy under comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySpec {
    /// Label used in reports and file names
    pub name: String,
    pub kind: PolicyKind,
    /// Backend context holding this policy's entries
    pub run_tag: String,
}

impl PolicySpec {
    pub fn new(name: impl Into<String>, kind: PolicyKind, run_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            run_tag: run_tag.into(),
        }
    }
}

/// Synthetic model settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub enabled: bool,
    pub sizes: Vec<usize>,
    pub latency_map_ms: BTreeMap<usize, u64>,
    pub fallback_sleep_ms: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sizes: DEFAULT_SYNTHETIC_SIZES.to_vec(),
            latency_map_ms: DEFAULT_SYNTHETIC_LATENCY_MS.iter().copied().collect(),
            fallback_sleep_ms: DEFAULT_SYNTHETIC_SLEEP_MS,
        }
    }
}

/// Everything a benchmark run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub model_name: String,
    pub endpoint: String,
    pub model_timeout_secs: u64,
    pub byte_budget: u64,
    /// Passed through to the backend
    pub similarity_max_distance: f64,
    pub prompt_file: PathBuf,
    /// 0 means every prompt in the file
    pub number_of_prompts: usize,
    pub output_dir: PathBuf,
    pub synthetic: SyntheticConfig,
    pub policies: Vec<PolicySpec>,
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model_timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
            byte_budget: DEFAULT_BYTE_BUDGET,
            similarity_max_distance: DEFAULT_SIMILARITY_MAX_DISTANCE,
            prompt_file: PathBuf::from(DEFAULT_PROMPT_FILE),
            number_of_prompts: DEFAULT_NUMBER_OF_PROMPTS,
            output_dir: PathBuf::from("."),
            synthetic: SyntheticConfig::default(),
            policies: vec![
                PolicySpec::new("lru", PolicyKind::LruByte, "lru-20k"),
                PolicySpec::new("costaware", PolicyKind::CostAware, "costaware-20k"),
            ],
            source: ConfigSource::Default,
        }
    }
}

impl BenchConfig {
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Reject configurations a run cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.policies.is_empty() {
            return Err(Error::configuration("at least one policy must be configured"));
        }

        let mut names = HashSet::new();
        let mut tags = HashSet::new();
        for policy in &self.policies {
            if policy.name.trim().is_empty() {
                return Err(Error::configuration("policy name must not be empty"));
            }
            if !names.insert(policy.name.as_str()) {
                return Err(Error::configuration(format!(
                    "duplicate policy name '{}'",
                    policy.name
                )));
            }
            if !tags.insert(policy.run_tag.as_str()) {
                return Err(Error::configuration(format!(
                    "duplicate run tag '{}'",
                    policy.run_tag
                )));
            }
        }

        if self.synthetic.enabled && self.synthetic.sizes.is_empty() {
            return Err(Error::configuration(
                "synthetic mode is enabled but no answer sizes are configured",
            ));
        }

        if self.model_timeout_secs == 0 {
            return Err(Error::configuration("model timeout must be greater than zero"));
        }

        if !(0.0..=1.0).contains(&self.similarity_max_distance) {
            return Err(Error::configuration(format!(
                "similarity_max_distance must be within [0, 1], got {}",
                self.similarity_max_distance
            )));
        }

        Ok(())
    }
}

/// Builder for creating benchmark configurations
#[derive(Debug, Default)]
pub struct BenchConfigBuilder {
    config: BenchConfig,
}

impl BenchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte_budget(mut self, byte_budget: u64) -> Self {
        self.config.byte_budget = byte_budget;
        self
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.config.model_name = model_name.into();
        self
    }

    pub fn with_synthetic(mut self, enabled: bool) -> Self {
        self.config.synthetic.enabled = enabled;
        self
    }

    pub fn with_policies(mut self, policies: Vec<PolicySpec>) -> Self {
        self.config.policies = policies;
        self
    }

    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.config.source = source;
        self
    }

    pub fn build(self) -> BenchConfig {
        self.config
    }
}
