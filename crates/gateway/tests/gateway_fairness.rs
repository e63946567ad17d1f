//! End-to-end checks of the multi-policy fairness protocol

use async_trait::async_trait;
use semcache_core::{Error, Result, RunTag};
use semcache_eviction::{CostAwarePolicy, LruBytePolicy, ManualClock, NoopPolicy};
use semcache_gateway::{
    CacheBackend, ContextHandle, InMemoryBackend, ModelEndpoint, MultiPolicyGateway, PolicyRunner,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers with a fixed-size body after a fixed delay and counts calls
struct CountingModel {
    calls: Arc<AtomicU64>,
    answer_len: usize,
    delay: Duration,
    fail_on: Option<&'static str>,
}

impl CountingModel {
    fn new(answer_len: usize, delay: Duration) -> (Self, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let model = Self {
            calls: calls.clone(),
            answer_len,
            delay,
            fail_on: None,
        };
        (model, calls)
    }

    fn failing_on(mut self, prompt: &'static str) -> Self {
        self.fail_on = Some(prompt);
        self
    }
}

#[async_trait]
impl ModelEndpoint for CountingModel {
    fn describe(&self) -> String {
        "counting".to_string()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail_on == Some(prompt) {
            return Err(Error::ModelTimeout {
                endpoint: "mock".to_string(),
                duration: self.delay,
            });
        }
        Ok(format!("{prompt}:").chars().cycle().take(self.answer_len).collect())
    }
}

/// In-memory backend whose reads or writes fail for one run tag
struct FlakyBackend {
    inner: InMemoryBackend,
    broken: RunTag,
    fail_gets: bool,
    fail_puts: bool,
}

#[async_trait]
impl CacheBackend for FlakyBackend {
    async fn activate(&mut self, run_tag: &RunTag) -> Result<ContextHandle> {
        self.inner.activate(run_tag).await
    }

    async fn get(&self, handle: &ContextHandle, prompt: &str) -> Result<Option<String>> {
        if self.fail_gets && handle.run_tag() == &self.broken {
            return Err(Error::backend(self.broken.as_str(), "read refused"));
        }
        self.inner.get(handle, prompt).await
    }

    async fn put(&mut self, handle: &ContextHandle, prompt: &str, answer: &str) -> Result<()> {
        if self.fail_puts && handle.run_tag() == &self.broken {
            return Err(Error::backend(self.broken.as_str(), "write refused"));
        }
        self.inner.put(handle, prompt, answer).await
    }
}

fn lru(name: &str, budget: u64) -> PolicyRunner {
    let clock = Arc::new(ManualClock::new());
    PolicyRunner::new(
        name,
        format!("{name}-tag"),
        Box::new(LruBytePolicy::new(budget, clock)),
    )
}

#[tokio::test]
async fn test_one_model_call_when_one_policy_misses() {
    let (model, calls) = CountingModel::new(16, Duration::from_millis(20));
    // "tight" cannot hold a 16 byte answer and denies it right after the write
    let runners = vec![lru("tight", 10), lru("roomy", 1024)];
    let mut gateway =
        MultiPolicyGateway::new(InMemoryBackend::new(0.85), model, runners).unwrap();

    let first = gateway.ask("P").await.unwrap();
    assert!(first.model_called);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let second = gateway.ask("P").await.unwrap();
    assert!(second.model_called);
    assert!(second.served_from_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(second.answer, first.answer);

    let tight = &gateway.runners()[0];
    let roomy = &gateway.runners()[1];
    assert!(tight.policy().is_denied(&"P".into()));
    assert_eq!(tight.miss_count(), 2);
    assert_eq!(roomy.hit_count(), 1);

    let tight_event = &tight.events()[1];
    assert!(!tight_event.hit);
    assert!(tight_event.model_ms >= 20.0);
    assert_eq!(tight_event.e2e_ms, tight_event.lookup_ms + tight_event.model_ms);

    let roomy_event = &roomy.events()[1];
    assert!(roomy_event.hit);
    assert_eq!(roomy_event.model_ms, 0.0);
    assert_eq!(roomy_event.e2e_ms, roomy_event.lookup_ms);
    assert!(roomy_event.e2e_ms < tight_event.e2e_ms);
}

#[tokio::test]
async fn test_no_model_call_when_every_policy_hits() {
    let (model, calls) = CountingModel::new(8, Duration::ZERO);
    let runners = vec![lru("a", 1024), lru("b", 1024)];
    let mut gateway =
        MultiPolicyGateway::new(InMemoryBackend::new(0.85), model, runners).unwrap();

    gateway.ask("q").await.unwrap();
    let outcome = gateway.ask("  q ").await.unwrap();
    assert!(!outcome.model_called);
    assert_eq!(outcome.model_ms, 0.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.model_calls(), 1);
}

#[tokio::test]
async fn test_eviction_does_not_leak_between_policies() {
    let (model, _) = CountingModel::new(40, Duration::ZERO);
    let clock = Arc::new(ManualClock::new());
    let runners = vec![
        PolicyRunner::new(
            "lru",
            "lru-tag",
            Box::new(LruBytePolicy::new(100, clock.clone())),
        ),
        PolicyRunner::new(
            "costaware",
            "cost-tag",
            Box::new(CostAwarePolicy::new(1_000, clock.clone())),
        ),
        PolicyRunner::new("noop", "noop-tag", Box::new(NoopPolicy::new())),
    ];
    let mut gateway =
        MultiPolicyGateway::new(InMemoryBackend::new(0.85), model, runners).unwrap();

    for prompt in ["a", "b", "c"] {
        gateway.ask(prompt).await.unwrap();
        clock.advance(Duration::from_secs(1));
    }

    let runners = gateway.into_runners();
    assert_eq!(runners[0].evictions(), 1);
    assert_eq!(runners[0].policy().bytes_used(), 80);
    assert!(runners[0].policy().is_denied(&"a".into()));

    assert_eq!(runners[1].evictions(), 0);
    assert_eq!(runners[1].policy().bytes_used(), 120);
    assert!(!runners[1].policy().is_denied(&"a".into()));

    assert_eq!(runners[2].evictions(), 0);
}

#[tokio::test]
async fn test_model_failure_skips_prompt_for_every_policy() {
    let (model, calls) = CountingModel::new(8, Duration::ZERO);
    let model = model.failing_on("bad");
    let runners = vec![lru("a", 1024), lru("b", 1024)];
    let mut gateway =
        MultiPolicyGateway::new(InMemoryBackend::new(0.85), model, runners).unwrap();

    let err = gateway.ask("bad").await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(gateway.skipped(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for runner in gateway.runners() {
        assert_eq!(runner.requests(), 0);
        assert!(runner.events().is_empty());
        assert_eq!(runner.policy().tracked(), 0);
    }

    gateway.ask("good").await.unwrap();
    for runner in gateway.runners() {
        assert_eq!(runner.requests(), 1);
    }
}

#[tokio::test]
async fn test_backfill_failure_still_records_metrics() {
    let (model, _) = CountingModel::new(8, Duration::ZERO);
    let backend = FlakyBackend {
        inner: InMemoryBackend::new(0.85),
        broken: RunTag::from("broken-tag"),
        fail_gets: false,
        fail_puts: true,
    };
    let runners = vec![lru("broken", 1024), lru("healthy", 1024)];
    let mut gateway = MultiPolicyGateway::new(backend, model, runners).unwrap();

    gateway.ask("q").await.unwrap();
    let second = gateway.ask("q").await.unwrap();
    assert!(second.served_from_cache);

    let broken = &gateway.runners()[0];
    assert_eq!(broken.miss_count(), 2);
    assert_eq!(broken.events().len(), 2);
    assert_eq!(broken.backfills(), 0);
    assert_eq!(broken.backfill_failures(), 2);
    assert_eq!(broken.policy().tracked(), 0);

    let healthy = &gateway.runners()[1];
    assert_eq!(healthy.backfills(), 1);
    assert_eq!(healthy.hit_count(), 1);
}

#[tokio::test]
async fn test_lookup_failure_counts_as_miss() {
    let (model, calls) = CountingModel::new(8, Duration::ZERO);
    let backend = FlakyBackend {
        inner: InMemoryBackend::new(0.85),
        broken: RunTag::from("flaky-tag"),
        fail_gets: true,
        fail_puts: false,
    };
    let runners = vec![lru("flaky", 1024), lru("steady", 1024)];
    let mut gateway = MultiPolicyGateway::new(backend, model, runners).unwrap();

    gateway.ask("q").await.unwrap();
    gateway.ask("q").await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(gateway.runners()[0].miss_count(), 2);
    assert_eq!(gateway.runners()[1].hit_count(), 1);
}

/// In-memory backend that takes a while to switch contexts
struct SlowSwitchBackend {
    inner: InMemoryBackend,
    switch_delay: Duration,
}

#[async_trait]
impl CacheBackend for SlowSwitchBackend {
    async fn activate(&mut self, run_tag: &RunTag) -> Result<ContextHandle> {
        tokio::time::sleep(self.switch_delay).await;
        self.inner.activate(run_tag).await
    }

    async fn get(&self, handle: &ContextHandle, prompt: &str) -> Result<Option<String>> {
        self.inner.get(handle, prompt).await
    }

    async fn put(&mut self, handle: &ContextHandle, prompt: &str, answer: &str) -> Result<()> {
        self.inner.put(handle, prompt, answer).await
    }
}

#[tokio::test]
async fn test_context_switch_is_not_charged_to_lookup() {
    let (model, _) = CountingModel::new(8, Duration::ZERO);
    let backend = SlowSwitchBackend {
        inner: InMemoryBackend::new(0.85),
        switch_delay: Duration::from_millis(80),
    };
    // two policies force a context switch before every lookup
    let runners = vec![lru("a", 1024), lru("b", 1024)];
    let mut gateway = MultiPolicyGateway::new(backend, model, runners).unwrap();

    gateway.ask("q").await.unwrap();
    let second = gateway.ask("q").await.unwrap();
    assert!(!second.model_called);

    for record in &second.lookups {
        assert!(record.hit);
        assert!(record.lookup_ms < 40.0, "lookup_ms = {}", record.lookup_ms);
    }
    for runner in gateway.runners() {
        let event = &runner.events()[1];
        assert!(event.hit);
        assert!(event.e2e_ms < 40.0, "e2e_ms = {}", event.e2e_ms);
    }
}
