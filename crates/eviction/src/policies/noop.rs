//! Baseline policy with no capacity limit

use crate::entry::PutMeta;
use crate::factory::PolicyKind;
use crate::traits::{EvictionOutcome, EvictionPolicy};
use semcache_core::{CacheKey, Result};

/// Control baseline: admits everything and never denies a key
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPolicy;

impl NoopPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl EvictionPolicy for NoopPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Noop
    }

    fn on_put(&mut self, _key: &CacheKey, _value: &str, _meta: &PutMeta) -> Result<()> {
        Ok(())
    }

    fn on_hit(&mut self, _key: &CacheKey) {}

    fn maybe_evict(&mut self) -> Result<EvictionOutcome> {
        Ok(EvictionOutcome::unchanged(0))
    }

    fn is_denied(&self, _key: &CacheKey) -> bool {
        false
    }

    fn bytes_used(&self) -> u64 {
        0
    }

    fn byte_budget(&self) -> Option<u64> {
        None
    }

    fn evictions(&self) -> u64 {
        0
    }

    fn tracked(&self) -> usize {
        0
    }

    fn resident_bytes(&self) -> u64 {
        0
    }
}
