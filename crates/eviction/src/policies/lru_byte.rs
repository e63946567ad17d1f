//! LRU (Least Recently Used) eviction bounded by bytes

use crate::clock::Clock;
use crate::entry::{CacheEntryMeta, PutMeta};
use crate::factory::PolicyKind;
use crate::ledger::BudgetLedger;
use crate::traits::{EvictionOutcome, EvictionPolicy};
use semcache_core::{CacheKey, Result};
use std::sync::Arc;

/// Byte-budget LRU.
///
/// Victims are taken oldest `last_access` first, ties broken by key order.
/// Size and hit count play no part in the ranking; size only decides how
/// many victims a pass needs.
pub struct LruBytePolicy {
    ledger: BudgetLedger,
}

impl LruBytePolicy {
    pub fn new(byte_budget: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: BudgetLedger::new("lru", byte_budget, clock),
        }
    }

    /// Metadata for a key, if tracked
    pub fn entry(&self, key: &CacheKey) -> Option<&CacheEntryMeta> {
        self.ledger.entry(key)
    }

    pub fn puts(&self) -> u64 {
        self.ledger.puts()
    }

    pub fn hits_seen(&self) -> u64 {
        self.ledger.hits_seen()
    }

    fn ranked_candidates(&self) -> Vec<(CacheKey, u64)> {
        let mut candidates: Vec<_> = self
            .ledger
            .candidates()
            .map(|(key, entry)| (entry.last_access, key.clone(), entry.size_bytes))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        candidates
            .into_iter()
            .map(|(_, key, size)| (key, size))
            .collect()
    }
}

impl EvictionPolicy for LruBytePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::LruByte
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
