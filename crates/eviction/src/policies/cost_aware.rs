//! Cost-aware eviction: keep the entries that save the most latency per byte

use crate::clock::Clock;
use crate::entry::{CacheEntryMeta, PutMeta};
use crate::factory::PolicyKind;
use crate::ledger::BudgetLedger;
use crate::traits::{EvictionOutcome, EvictionPolicy};
use semcache_core::{CacheKey, Result, HIT_BONUS_PER_HIT, RECENCY_HALF_LIFE_SECS};
use std::sync::Arc;
use std::time::Instant;

/// Value per byte of keeping an entry resident.
///
/// ```text
/// recency = 1 / (1 + age_seconds / 300)
/// benefit = saved_latency_ms * (1 + 0.25 * hits) * recency
/// score   = benefit / max(1, size_bytes)
/// ```
pub fn cost_score(entry: &CacheEntryMeta, now: Instant) -> f64 {
    let age_secs = now.saturating_duration_since(entry.last_access).as_secs_f64();
    let recency = 1.0 / (1.0 + age_secs / RECENCY_HALF_LIFE_SECS);
    let benefit = entry.saved_latency_ms * (1.0 + HIT_BONUS_PER_HIT * entry.hits as f64) * recency;
    benefit / entry.size_bytes.max(1) as f64
}

/// Byte-budget policy that denies the lowest-scoring entries first.
///
/// Scores are a single snapshot taken at the start of each `maybe_evict`
/// pass; they are not recomputed between victims.
pub struct CostAwarePolicy {
    ledger: BudgetLedger,
}

impl CostAwarePolicy {
    pub fn new(byte_budget: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: BudgetLedger::new("costaware", byte_budget, clock),
        }
    }

    /// Metadata for a key, if tracked
    pub fn entry(&self, key: &CacheKey) -> Option<&CacheEntryMeta> {
        self.ledger.entry(key)
    }

    /// Current score of a tracked key
    pub fn score(&self, key: &CacheKey) -> Option<f64> {
        let now = self.ledger.now();
        self.ledger.entry(key).map(|entry| cost_score(entry, now))
    }

    pub fn puts(&self) -> u64 {
        self.ledger.puts()
    }

    pub fn hits_seen(&self) -> u64 {
        self.ledger.hits_seen()
    }

    fn ranked_candidates(&self) -> Vec<(CacheKey, u64)> {
        let now = self.ledger.now();
        let mut candidates: Vec<_> = self
            .ledger
            .candidates()
            .map(|(key, entry)| (cost_score(entry, now), key.clone(), entry.size_bytes))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        candidates
            .into_iter()
            .map(|(_, key, size)| (key, size))
            .collect()
    }
}

impl EvictionPolicy for CostAwarePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::CostAware
    }

    fn on_put(&mut self, key: &CacheKey, value: &str, meta: &PutMeta) -> Result<()> {
        self.ledger.admit(key, value, meta)
    }

    fn on_hit(&mut self, key: &CacheKey) {
        self.ledger.record_hit(key);
    }

    fn maybe_evict(&mut self) -> Result<EvictionOutcome> {
        if !self.ledger.over_budget() {
            return Ok(EvictionOutcome::unchanged(self.ledger.bytes_used()));
        }
        let ranked = self.ranked_candidates();
        self.ledger.deny_in_order(ranked)
    }

    fn is_denied(&self, key: &CacheKey) -> bool {
        self.ledger.is_denied(key)
    }

    fn bytes_used(&self) -> u64 {
        self.ledger.bytes_used()
    }

    fn byte_budget(&self) -> Option<u64> {
        Some(self.ledger.byte_budget())
    }

    fn evictions(&self) -> u64 {
        self.ledger.evictions()
    }

    fn tracked(&self) -> usize {
        self.ledger.tracked()
    }

    fn resident_bytes(&self) -> u64 {
        self.ledger.resident_bytes()
    }
}
