//! Configuration for semcache benchmark runs
//!
//! Settings are resolved in increasing precedence: built-in defaults, a JSON
//! config file, `SEMCACHE_*` environment variables, then command line flags.

pub mod config;
pub mod loader;

pub use config::{BenchConfig, BenchConfigBuilder, ConfigSource, PolicySpec, SyntheticConfig};
pub use loader::{BenchConfigLoader, CliOverrides};
