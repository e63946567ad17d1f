//! Byte-budget bookkeeping shared by the budgeted policies
//!
//! The ledger owns the metadata map, the denylist and the `bytes_used`
//! counter. Policies only decide the order in which candidates are denied.

use crate::clock::Clock;
use crate::entry::{CacheEntryMeta, PutMeta};
use crate::traits::EvictionOutcome;
use semcache_core::{CacheKey, Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) struct BudgetLedger {
    label: &'static str,
    byte_budget: u64,
    bytes_used: u64,
    evictions: u64,
    puts: u64,
    hits_seen: u64,
    entries: HashMap<CacheKey, CacheEntryMeta>,
    denied: HashSet<CacheKey>,
    clock: Arc<dyn Clock>,
}

impl BudgetLedger {
    pub(crate) fn new(label: &'static str, byte_budget: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            label,
            byte_budget,
            bytes_used: 0,
            evictions: 0,
            puts: 0,
            hits_seen: 0,
            entries: HashMap::new(),
            denied: HashSet::new(),
            clock,
        }
    }

    /// Insert or refresh a key.
    ///
    /// A refresh adjusts `bytes_used` by the size delta. A denied key already
    /// had its bytes released, so re-admitting it adds the full new size.
    pub(crate) fn admit(&mut self, key: &CacheKey, value: &str, meta: &PutMeta) -> Result<()> {
        let now = self.clock.now();
        let size = meta.resolved_size(value);
        let saved = meta.resolved_saved_latency();
        let was_denied = self.denied.contains(key);

        let bytes_used = match self.entries.get(key) {
            Some(_) if was_denied => self.bytes_used.checked_add(size),
            Some(existing) => self
                .bytes_used
                .checked_sub(existing.size_bytes)
                .and_then(|rest| rest.checked_add(size)),
            None => self.bytes_used.checked_add(size),
        }
        .ok_or_else(|| {
            Error::accounting(
                key.fingerprint(),
                format!(
                    "{} ledger cannot apply size {size} to {} used bytes",
                    self.label, self.bytes_used
                ),
            )
        })?;

        self.bytes_used = bytes_used;
        self.puts += 1;
        self.entries
            .entry(key.clone())
            .and_modify(|entry| {
                entry.size_bytes = size;
                entry.last_access = now;
                entry.saved_latency_ms = entry.saved_latency_ms.max(saved);
            })
            .or_insert_with(|| CacheEntryMeta::new(size, saved, now));

        if was_denied {
            self.denied.remove(key);
            debug!(policy = self.label, key = %key.fingerprint(), "re-admitted denied key");
        }
        Ok(())
    }

    pub(crate) fn record_hit(&mut self, key: &CacheKey) {
        self.hits_seen += 1;
        let now = self.clock.now();
        if let Some(entry) = self.entries.get_mut(key) {
            entry.hits += 1;
            entry.last_access = now;
        }
    }

    pub(crate) fn over_budget(&self) -> bool {
        self.bytes_used > self.byte_budget
    }

    /// Resident (non-denied) entries, the only eviction candidates
    pub(crate) fn candidates(&self) -> impl Iterator<Item = (&CacheKey, &CacheEntryMeta)> {
        self.entries
            .iter()
            .filter(|(key, _)| !self.denied.contains(*key))
    }

    /// Deny keys in the given order until the budget is respected.
    ///
    /// Callers pass an empty list when there is nothing to rank; that case
    /// and the under-budget case leave every counter untouched.
    pub(crate) fn deny_in_order(
        &mut self,
        ranked: Vec<(CacheKey, u64)>,
    ) -> Result<EvictionOutcome> {
        let bytes_before = self.bytes_used;
        if !self.over_budget() {
            return Ok(EvictionOutcome::unchanged(bytes_before));
        }
        if ranked.is_empty() {
            debug!(
                policy = self.label,
                bytes_used = self.bytes_used,
                byte_budget = self.byte_budget,
                "over budget but no eviction candidates"
            );
            return Ok(EvictionOutcome::unchanged(bytes_before));
        }

        let mut victims = Vec::new();
        for (key, size) in ranked {
            if !self.over_budget() {
                break;
            }
            if self.denied.contains(&key) {
                continue;
            }
            self.bytes_used = self.bytes_used.checked_sub(size).ok_or_else(|| {
                Error::accounting(
                    key.fingerprint(),
                    format!(
                        "{} ledger would release {size} bytes with only {} in use",
                        self.label, self.bytes_used
                    ),
                )
            })?;
            self.denied.insert(key.clone());
            self.evictions += 1;
            victims.push((key, size));
        }

        let outcome = EvictionOutcome {
            victims,
            bytes_before,
            bytes_after: self.bytes_used,
        };
        if outcome.victims.is_empty() {
            debug!(
                policy = self.label,
                bytes_used = bytes_before,
                byte_budget = self.byte_budget,
                "over budget but no victims selected"
            );
        } else {
            info!(
                policy = self.label,
                evicted = outcome.evicted(),
                bytes_before,
                bytes_after = self.bytes_used,
                byte_budget = self.byte_budget,
                "evicted entries"
            );
        }
        Ok(outcome)
    }

    pub(crate) fn is_denied(&self, key: &CacheKey) -> bool {
        self.denied.contains(key)
    }

    pub(crate) fn now(&self) -> std::time::Instant {
        self.clock.now()
    }

    pub(crate) fn bytes_used(&self) -> u64 {
        self.bytes_used
    }

    pub(crate) fn byte_budget(&self) -> u64 {
        self.byte_budget
    }

    pub(crate) fn evictions(&self) -> u64 {
        self.evictions
    }

    pub(crate) fn puts(&self) -> u64 {
        self.puts
    }

    pub(crate) fn hits_seen(&self) -> u64 {
        self.hits_seen
    }

    pub(crate) fn tracked(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry(&self, key: &CacheKey) -> Option<&CacheEntryMeta> {
        self.entries.get(key)
    }

    pub(crate) fn resident_bytes(&self) -> u64 {
        self.candidates().map(|(_, entry)| entry.size_bytes).sum()
    }
}
