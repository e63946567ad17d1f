//! Deterministic stand-in model for load tests without a live endpoint

use super::ModelEndpoint;
use async_trait::async_trait;
use semcache_core::{
    Error, Result, DEFAULT_SYNTHETIC_LATENCY_MS, DEFAULT_SYNTHETIC_SIZES,
    DEFAULT_SYNTHETIC_SLEEP_MS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use xxhash_rust::xxh3::xxh3_64;

/// Answer sizes and the latency each size costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSettings {
    pub sizes: Vec<usize>,
    pub latency_map_ms: BTreeMap<usize, u64>,
    /// Latency for sizes missing from the map
    pub fallback_sleep_ms: u64,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SYNTHETIC_SIZES.to_vec(),
            latency_map_ms: DEFAULT_SYNTHETIC_LATENCY_MS.iter().copied().collect(),
            fallback_sleep_ms: DEFAULT_SYNTHETIC_SLEEP_MS,
        }
    }
}

/// Answers every prompt with `size` bytes of filler after a size-dependent delay.
///
/// The size is picked from the prompt's hash, so the same prompt always costs
/// the same bytes and latency across runs.
#[derive(Debug, Clone)]
pub struct SyntheticModel {
    settings: SyntheticSettings,
}

impl SyntheticModel {
    pub fn new(settings: SyntheticSettings) -> Result<Self> {
        if settings.sizes.is_empty() {
            return Err(Error::configuration(
                "synthetic mode needs at least one answer size",
            ));
        }
        Ok(Self { settings })
    }

    pub fn answer_size(&self, prompt: &str) -> usize {
        let sizes = &self.settings.sizes;
        sizes[(xxh3_64(prompt.as_bytes()) % sizes.len() as u64) as usize]
    }

    pub fn latency_for(&self, size: usize) -> Duration {
        let ms = self
            .settings
            .latency_map_ms
            .get(&size)
            .copied()
            .unwrap_or(self.settings.fallback_sleep_ms);
        Duration::from_millis(ms)
    }
}

#[async_trait]
impl ModelEndpoint for SyntheticModel {
    fn describe(&self) -> String {
        format!("synthetic sizes={:?}", self.settings.sizes)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let size = self.answer_size(prompt);
        let delay = self.latency_for(size);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok("x".repeat(size))
    }
}
