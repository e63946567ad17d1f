//! One prompt through every policy, with a single shared model call

use crate::backend::{CacheBackend, ContextHandle};
use crate::model::ModelEndpoint;
use crate::runner::PolicyRunner;
use semcache_core::{CacheKey, Error, Result};
use semcache_eviction::PutMeta;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of one policy's lookup for the current prompt
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRecord {
    /// Index into the gateway's runners
    pub runner: usize,
    pub hit: bool,
    pub lookup_ms: f64,
    pub cached: Option<String>,
}

/// What the caller gets back for one prompt
#[derive(Debug, Clone, PartialEq)]
pub struct AskOutcome {
    pub answer: String,
    /// At least one policy hit and its answer was returned
    pub served_from_cache: bool,
    pub model_called: bool,
    pub model_ms: f64,
    pub lookups: Vec<LookupRecord>,
}

/// Runs N eviction policies side by side over one backend and one model.
///
/// Every policy sees every prompt. The model is called at most once per
/// prompt no matter how many policies missed, and only policies that missed
/// are charged for it.
pub struct MultiPolicyGateway<B, M> {
    backend: B,
    model: M,
    runners: Vec<PolicyRunner>,
    active: Option<ContextHandle>,
    model_calls: u64,
    skipped: u64,
}

impl<B, M> MultiPolicyGateway<B, M>
where
    B: CacheBackend,
    M: ModelEndpoint,
{
    pub fn new(backend: B, model: M, runners: Vec<PolicyRunner>) -> Result<Self> {
        if runners.is_empty() {
            return Err(Error::configuration("gateway needs at least one policy"));
        }

        let mut names = HashSet::new();
        let mut tags = HashSet::new();
        for runner in &runners {
            if !names.insert(runner.name()) {
                return Err(Error::configuration(format!(
                    "duplicate policy name '{}'",
                    runner.name()
                )));
            }
            if !tags.insert(runner.run_tag()) {
                return Err(Error::configuration(format!(
                    "duplicate run tag '{}'",
                    runner.run_tag()
                )));
            }
        }

        info!(
            policies = runners.len(),
            model = %model.describe(),
            "multi-policy gateway ready"
        );

        Ok(Self {
            backend,
            model,
            runners,
            active: None,
            model_calls: 0,
            skipped: 0,
        })
    }

    /// Resolve one prompt for every policy.
    ///
    /// A model failure is returned as-is and leaves every runner untouched,
    /// so the prompt counts as skipped for all policies alike.
    pub async fn ask(&mut self, prompt: &str) -> Result<AskOutcome> {
        let key = CacheKey::from(prompt);

        let mut lookups = Vec::with_capacity(self.runners.len());
        for idx in 0..self.runners.len() {
            lookups.push(self.lookup(idx, &key).await);
        }

        let any_miss = lookups.iter().any(|record| !record.hit);
        let (model_answer, model_ms) = if any_miss {
            self.model_calls += 1;
            let started = Instant::now();
            match self.model.generate(prompt).await {
                Ok(answer) => (Some(answer), elapsed_ms(started)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(key = %key.fingerprint(), error = %e, "model call failed, prompt skipped");
                    return Err(e);
                }
            }
        } else {
            (None, 0.0)
        };

        for record in &lookups {
            if record.hit {
                self.runners[record.runner].record_hit(&key, record.lookup_ms);
            }
        }

        if let Some(answer) = &model_answer {
            for record in lookups.iter().filter(|record| !record.hit) {
                let succeeded = self.backfill(record.runner, &key, answer, model_ms).await;
                let runner = &mut self.runners[record.runner];
                runner.record_backfill(succeeded);
                runner.record_miss(&key, record.lookup_ms, model_ms);
            }
        }

        let cached = lookups.iter().find_map(|record| record.cached.clone());
        let served_from_cache = cached.is_some();
        let answer = match (cached, model_answer) {
            (Some(answer), _) | (None, Some(answer)) => answer,
            (None, None) => String::new(),
        };

        Ok(AskOutcome {
            answer,
            served_from_cache,
            model_called: any_miss,
            model_ms,
            lookups,
        })
    }

    pub fn runners(&self) -> &[PolicyRunner] {
        &self.runners
    }

    pub fn into_runners(self) -> Vec<PolicyRunner> {
        self.runners
    }

    /// Upstream calls issued, successful or not
    pub fn model_calls(&self) -> u64 {
        self.model_calls
    }

    /// Prompts dropped because the model call failed
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn ensure_active(&mut self, idx: usize) -> Result<ContextHandle> {
        let run_tag = self.runners[idx].run_tag();
        if let Some(active) = &self.active {
            if active.run_tag() == run_tag {
                return Ok(active.clone());
            }
        }
        let run_tag = run_tag.clone();
        let handle = self.backend.activate(&run_tag).await?;
        debug!(run_tag = %run_tag, generation = handle.generation(), "switched cache context");
        self.active = Some(handle.clone());
        Ok(handle)
    }

    /// Context switching happens before the clock starts; only the read and
    /// the denylist check are charged to the lookup.
    async fn lookup(&mut self, idx: usize, key: &CacheKey) -> LookupRecord {
        let handle = self.ensure_active(idx).await;
        let started = Instant::now();
        let found = match handle {
            Ok(handle) => self.backend.get(&handle, key.as_str()).await,
            Err(e) => Err(e),
        };
        let found = match found {
            Ok(found) => found,
            Err(e) => {
                self.active = None;
                warn!(
                    policy = %self.runners[idx].name(),
                    error = %e,
                    "cache lookup failed, treating as miss"
                );
                None
            }
        };
        let cached = found.filter(|_| !self.runners[idx].policy().is_denied(key));
        let lookup_ms = elapsed_ms(started);

        debug!(
            policy = %self.runners[idx].name(),
            key = %key.fingerprint(),
            hit = cached.is_some(),
            lookup_ms,
            "lookup"
        );

        LookupRecord {
            runner: idx,
            hit: cached.is_some(),
            lookup_ms,
            cached,
        }
    }

    /// Write the model answer into one policy's context and let it evict.
    /// Failures are logged; the caller still records the request.
    async fn backfill(&mut self, idx: usize, key: &CacheKey, answer: &str, model_ms: f64) -> bool {
        let written = match self.ensure_active(idx).await {
            Ok(handle) => self.backend.put(&handle, key.as_str(), answer).await,
            Err(e) => Err(e),
        };

        let runner = &mut self.runners[idx];
        if let Err(e) = written {
            self.active = None;
            warn!(policy = %runner.name(), key = %key.fingerprint(), error = %e, "backfill write failed");
            return false;
        }

        let meta = PutMeta::new()
            .with_size(answer.len() as u64)
            .with_saved_latency(model_ms);
        let policy = runner.policy_mut();
        if let Err(e) = policy.on_put(key, answer, &meta) {
            warn!(policy = %runner.name(), key = %key.fingerprint(), error = %e, "policy admission failed");
            return false;
        }

        let policy = runner.policy_mut();
        match policy.maybe_evict() {
            Ok(outcome) if outcome.evicted() > 0 => {
                debug!(
                    policy = %runner.name(),
                    evicted = outcome.evicted(),
                    bytes_freed = outcome.bytes_freed(),
                    "evicted after backfill"
                );
                true
            }
            Ok(_) => true,
            Err(e) => {
                warn!(policy = %runner.name(), error = %e, "eviction pass failed");
                false
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::model::{SyntheticModel, SyntheticSettings};
    use semcache_eviction::{ManualClock, NoopPolicy};
    use std::sync::Arc;

    fn model() -> SyntheticModel {
        SyntheticModel::new(SyntheticSettings {
            sizes: vec![16],
            latency_map_ms: Default::default(),
            fallback_sleep_ms: 0,
        })
        .unwrap()
    }

    fn noop(name: &str, tag: &str) -> PolicyRunner {
        PolicyRunner::new(name, tag, Box::new(NoopPolicy::new()))
    }

    #[test]
    fn test_rejects_empty_and_duplicate_runners() {
        let err = MultiPolicyGateway::new(InMemoryBackend::new(0.85), model(), vec![]);
        assert!(matches!(err, Err(Error::Configuration { .. })));

        let err = MultiPolicyGateway::new(
            InMemoryBackend::new(0.85),
            model(),
            vec![noop("a", "t1"), noop("a", "t2")],
        );
        assert!(err.is_err());

        let err = MultiPolicyGateway::new(
            InMemoryBackend::new(0.85),
            model(),
            vec![noop("a", "t1"), noop("b", "t1")],
        );
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_second_ask_is_served_from_cache() {
        let clock = Arc::new(ManualClock::new());
        let lru = semcache_eviction::LruBytePolicy::new(1024, clock);
        let mut gateway = MultiPolicyGateway::new(
            InMemoryBackend::new(0.85),
            model(),
            vec![PolicyRunner::new("lru", "lru-20k", Box::new(lru))],
        )
        .unwrap();

        let first = gateway.ask("hello").await.unwrap();
        assert!(first.model_called);
        assert!(!first.served_from_cache);
        assert_eq!(first.answer.len(), 16);

        let second = gateway.ask("hello").await.unwrap();
        assert!(!second.model_called);
        assert!(second.served_from_cache);
        assert_eq!(second.answer, first.answer);
        assert_eq!(gateway.model_calls(), 1);

        let runner = &gateway.runners()[0];
        assert_eq!((runner.hit_count(), runner.miss_count()), (1, 1));
        assert_eq!(runner.backfills(), 1);
    }

    #[tokio::test]
    async fn test_activation_only_on_context_change() {
        let mut gateway = MultiPolicyGateway::new(
            InMemoryBackend::new(0.85),
            model(),
            vec![noop("only", "only-tag")],
        )
        .unwrap();

        gateway.ask("a").await.unwrap();
        gateway.ask("b").await.unwrap();
        gateway.ask("a").await.unwrap();
        assert_eq!(gateway.backend().activations(), 1);
    }
}
