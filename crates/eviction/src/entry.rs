//! Per-key metadata tracked by budgeted policies

use std::time::Instant;

/// Bookkeeping for one cached answer
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntryMeta {
    /// Byte size of the cached value
    pub size_bytes: u64,
    /// Most recent read or write
    pub last_access: Instant,
    /// Reads since the entry was created
    pub hits: u64,
    /// Running maximum of the model latency a future hit would avoid
    pub saved_latency_ms: f64,
}

impl CacheEntryMeta {
    pub fn new(size_bytes: u64, saved_latency_ms: f64, now: Instant) -> Self {
        Self {
            size_bytes,
            last_access: now,
            hits: 0,
            saved_latency_ms,
        }
    }
}

/// Metadata supplied alongside a write.
///
/// Every field is optional; absent values fall back to the byte length of
/// the written value (size) or zero (saved latency).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PutMeta {
    pub size_bytes: Option<u64>,
    pub saved_latency_ms: Option<f64>,
}

impl PutMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    pub fn with_saved_latency(mut self, saved_latency_ms: f64) -> Self {
        self.saved_latency_ms = Some(saved_latency_ms);
        self
    }

    pub(crate) fn resolved_size(&self, value: &str) -> u64 {
        self.size_bytes.unwrap_or(value.len() as u64)
    }

    /// Non-finite or negative latencies degrade to zero
    pub(crate) fn resolved_saved_latency(&self) -> f64 {
        match self.saved_latency_ms {
            Some(ms) if ms.is_finite() && ms > 0.0 => ms,
            _ => 0.0,
        }
    }
}
