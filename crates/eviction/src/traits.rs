//! Core eviction policy trait definition

use crate::entry::PutMeta;
use crate::factory::PolicyKind;
use semcache_core::{CacheKey, Result};

/// What a single `maybe_evict` pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionOutcome {
    /// Keys moved into the denylist, with the bytes each one freed
    pub victims: Vec<(CacheKey, u64)>,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl EvictionOutcome {
    pub(crate) fn unchanged(bytes_used: u64) -> Self {
        Self {
            victims: Vec::new(),
            bytes_before: bytes_used,
            bytes_after: bytes_used,
        }
    }

    pub fn evicted(&self) -> usize {
        self.victims.len()
    }

    pub fn bytes_freed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Eviction policy trait
///
/// Implementations own their metadata map and denylist outright; nothing is
/// shared between two policy instances.
pub trait EvictionPolicy: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> PolicyKind;

    /// Admit or refresh a key after its value was written
    fn on_put(&mut self, key: &CacheKey, value: &str, meta: &PutMeta) -> Result<()>;

    /// Record a read. Unknown keys are ignored.
    fn on_hit(&mut self, key: &CacheKey);

    /// Deny victims until the byte budget is respected
    fn maybe_evict(&mut self) -> Result<EvictionOutcome>;

    /// Whether lookups for this key must be treated as misses
    fn is_denied(&self, key: &CacheKey) -> bool;

    /// Bytes held by resident (non-denied) keys
    fn bytes_used(&self) -> u64;

    /// Configured budget, `None` when unbounded
    fn byte_budget(&self) -> Option<u64>;

    /// Victims denied so far
    fn evictions(&self) -> u64;

    /// Keys with metadata, denied or not
    fn tracked(&self) -> usize;

    /// Recomputes the resident byte total from metadata; must equal `bytes_used`
    fn resident_bytes(&self) -> u64;
}
