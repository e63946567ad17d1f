//! Per-policy state carried through a benchmark run

use chrono::{DateTime, Utc};
use semcache_core::{CacheKey, RunTag};
use semcache_eviction::EvictionPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a request was resolved for one policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupPath {
    #[serde(rename = "lookup_hit")]
    LookupHit,
    #[serde(rename = "lookup_miss+model")]
    LookupMissModel,
}

impl LookupPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupPath::LookupHit => "lookup_hit",
            LookupPath::LookupMissModel => "lookup_miss+model",
        }
    }
}

impl fmt::Display for LookupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request as seen by one policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEvent {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    pub hit: bool,
    pub lookup_ms: f64,
    pub model_ms: f64,
    pub e2e_ms: f64,
    pub path: LookupPath,
}

/// An eviction policy plus everything measured about it
pub struct PolicyRunner {
    name: String,
    run_tag: RunTag,
    policy: Box<dyn EvictionPolicy>,
    hit_count: u64,
    miss_count: u64,
    latencies_ms: Vec<f64>,
    events: Vec<RequestEvent>,
    backfills: u64,
    backfill_failures: u64,
}

impl PolicyRunner {
    pub fn new(
        name: impl Into<String>,
        run_tag: impl Into<RunTag>,
        policy: Box<dyn EvictionPolicy>,
    ) -> Self {
        Self {
            name: name.into(),
            run_tag: run_tag.into(),
            policy,
            hit_count: 0,
            miss_count: 0,
            latencies_ms: Vec::new(),
            events: Vec::new(),
            backfills: 0,
            backfill_failures: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run_tag(&self) -> &RunTag {
        &self.run_tag
    }

    pub fn policy(&self) -> &dyn EvictionPolicy {
        self.policy.as_ref()
    }

    pub fn policy_mut(&mut self) -> &mut dyn EvictionPolicy {
        self.policy.as_mut()
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    pub fn miss_count(&self) -> u64 {
        self.miss_count
    }

    pub fn requests(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// End-to-end latency per request, in arrival order
    pub fn latencies_ms(&self) -> &[f64] {
        &self.latencies_ms
    }

    pub fn events(&self) -> &[RequestEvent] {
        &self.events
    }

    /// Successful writes of a model answer into this policy's context
    pub fn backfills(&self) -> u64 {
        self.backfills
    }

    pub fn backfill_failures(&self) -> u64 {
        self.backfill_failures
    }

    pub fn evictions(&self) -> u64 {
        self.policy.evictions()
    }

    pub(crate) fn record_hit(&mut self, key: &CacheKey, lookup_ms: f64) {
        self.policy.on_hit(key);
        self.hit_count += 1;
        self.push_event(key, true, lookup_ms, 0.0);
    }

    pub(crate) fn record_miss(&mut self, key: &CacheKey, lookup_ms: f64, model_ms: f64) {
        self.miss_count += 1;
        self.push_event(key, false, lookup_ms, model_ms);
    }

    pub(crate) fn record_backfill(&mut self, succeeded: bool) {
        if succeeded {
            self.backfills += 1;
        } else {
            self.backfill_failures += 1;
        }
    }

    fn push_event(&mut self, key: &CacheKey, hit: bool, lookup_ms: f64, model_ms: f64) {
        let e2e_ms = lookup_ms + model_ms;
        self.latencies_ms.push(e2e_ms);
        self.events.push(RequestEvent {
            timestamp: Utc::now(),
            prompt: key.as_str().to_string(),
            hit,
            lookup_ms,
            model_ms,
            e2e_ms,
            path: if hit {
                LookupPath::LookupHit
            } else {
                LookupPath::LookupMissModel
            },
        });
    }
}

impl fmt::Debug for PolicyRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRunner")
            .field("name", &self.name)
            .field("run_tag", &self.run_tag)
            .field("kind", &self.policy.kind())
            .field("hit_count", &self.hit_count)
            .field("miss_count", &self.miss_count)
            .field("events", &self.events.len())
            .finish()
    }
}
