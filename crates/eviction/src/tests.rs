//! Tests for eviction policies

use super::*;
use proptest::prelude::*;
use semcache_core::CacheKey;
use std::sync::Arc;
use std::time::Duration;

fn key(s: &str) -> CacheKey {
    CacheKey::from(s)
}

fn sized(size: u64) -> PutMeta {
    PutMeta::new().with_size(size)
}

fn manual() -> Arc<ManualClock> {
    Arc::new(ManualClock::new())
}

#[test]
fn test_lru_eviction() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(100, clock.clone());

    for k in ["a", "b", "c"] {
        policy.on_put(&key(k), "", &sized(40)).unwrap();
        clock.advance(Duration::from_millis(10));
    }
    assert_eq!(policy.bytes_used(), 120);

    let outcome = policy.maybe_evict().unwrap();
    assert_eq!(outcome.victims, vec![(key("a"), 40)]);
    assert!(policy.is_denied(&key("a")));
    assert_eq!(policy.bytes_used(), 80);
    assert_eq!(policy.evictions(), 1);
}

#[test]
fn test_lru_hit_refreshes_recency() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(100, clock.clone());

    policy.on_put(&key("a"), "", &sized(40)).unwrap();
    clock.advance(Duration::from_secs(1));
    policy.on_put(&key("b"), "", &sized(40)).unwrap();
    clock.advance(Duration::from_secs(1));
    policy.on_hit(&key("a"));
    clock.advance(Duration::from_secs(1));
    policy.on_put(&key("c"), "", &sized(40)).unwrap();

    policy.maybe_evict().unwrap();
    assert!(policy.is_denied(&key("b")));
    assert!(!policy.is_denied(&key("a")));
    assert_eq!(policy.entry(&key("a")).unwrap().hits, 1);
    assert_eq!(policy.hits_seen(), 1);
}

#[test]
fn test_lru_ties_break_by_key_order() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(50, clock);

    // Same instant for every write
    for k in ["c", "a", "b"] {
        policy.on_put(&key(k), "", &sized(25)).unwrap();
    }
    let outcome = policy.maybe_evict().unwrap();
    assert_eq!(outcome.victims, vec![(key("a"), 25)]);
    assert_eq!(policy.bytes_used(), 50);
}

#[test]
fn test_lru_evicts_multiple_victims_in_one_pass() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(100, clock.clone());

    for k in ["a", "b", "c"] {
        policy.on_put(&key(k), "", &sized(30)).unwrap();
        clock.advance(Duration::from_millis(1));
    }
    policy.on_put(&key("big"), "", &sized(90)).unwrap();

    let outcome = policy.maybe_evict().unwrap();
    assert_eq!(outcome.evicted(), 3);
    assert_eq!(outcome.bytes_before, 180);
    assert_eq!(outcome.bytes_after, 90);
    assert_eq!(outcome.bytes_freed(), 90);
    assert!(!policy.is_denied(&key("big")));
}

#[test]
fn test_cost_aware_ranking() {
    let clock = manual();
    let mut policy = CostAwarePolicy::new(150, clock);

    policy
        .on_put(&key("expensive"), "", &sized(100).with_saved_latency(200.0))
        .unwrap();
    policy
        .on_put(&key("cheap"), "", &sized(100).with_saved_latency(20.0))
        .unwrap();

    let outcome = policy.maybe_evict().unwrap();
    assert_eq!(outcome.victims, vec![(key("cheap"), 100)]);
    assert!(policy.is_denied(&key("cheap")));
    assert!(!policy.is_denied(&key("expensive")));
    assert_eq!(policy.bytes_used(), 100);
}

#[test]
fn test_cost_aware_prefers_keeping_hot_entries() {
    let clock = manual();
    let mut policy = CostAwarePolicy::new(150, clock);

    policy
        .on_put(&key("cold"), "", &sized(100).with_saved_latency(100.0))
        .unwrap();
    policy
        .on_put(&key("hot"), "", &sized(100).with_saved_latency(100.0))
        .unwrap();
    for _ in 0..3 {
        policy.on_hit(&key("hot"));
    }

    policy.maybe_evict().unwrap();
    assert!(policy.is_denied(&key("cold")));
    assert!(policy.score(&key("hot")).unwrap() > policy.score(&key("cold")).unwrap());
}

#[test]
fn test_cost_aware_saved_latency_is_running_max() {
    let clock = manual();
    let mut policy = CostAwarePolicy::new(1_000, clock);

    policy
        .on_put(&key("a"), "", &sized(10).with_saved_latency(200.0))
        .unwrap();
    policy
        .on_put(&key("a"), "", &sized(10).with_saved_latency(50.0))
        .unwrap();
    assert_eq!(policy.entry(&key("a")).unwrap().saved_latency_ms, 200.0);
    assert_eq!(policy.puts(), 2);
}

#[test]
fn test_maybe_evict_under_budget_is_idempotent() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(100, clock);
    policy.on_put(&key("a"), "", &sized(60)).unwrap();

    for _ in 0..3 {
        let outcome = policy.maybe_evict().unwrap();
        assert_eq!(outcome, EvictionOutcome::unchanged(60));
    }
    assert_eq!(policy.evictions(), 0);
    assert!(!policy.is_denied(&key("a")));
}

#[test]
fn test_no_candidates_is_a_noop() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(10, clock);
    policy.on_put(&key("a"), "", &sized(30)).unwrap();
    policy.maybe_evict().unwrap();
    assert!(policy.is_denied(&key("a")));
    assert_eq!(policy.bytes_used(), 0);

    // Everything is already denied; another pass must not double count
    let outcome = policy.maybe_evict().unwrap();
    assert!(outcome.victims.is_empty());
    assert_eq!(policy.evictions(), 1);
}

#[test]
fn test_rewrite_undenies_key() {
    let clock = manual();
    let mut policy = CostAwarePolicy::new(50, clock);
    policy.on_put(&key("a"), "", &sized(80)).unwrap();
    policy.maybe_evict().unwrap();
    assert!(policy.is_denied(&key("a")));

    policy.on_put(&key("a"), "", &sized(20)).unwrap();
    assert!(!policy.is_denied(&key("a")));
    assert_eq!(policy.bytes_used(), 20);
}

#[test]
fn test_size_change_adjusts_by_delta() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(1_000, clock);
    policy.on_put(&key("a"), "", &sized(100)).unwrap();
    policy.on_put(&key("b"), "", &sized(50)).unwrap();
    policy.on_put(&key("a"), "", &sized(30)).unwrap();
    assert_eq!(policy.bytes_used(), 80);
    assert_eq!(policy.resident_bytes(), 80);
    assert_eq!(policy.tracked(), 2);
}

#[test]
fn test_deny_rewrite_deny_round_trip() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(100, clock.clone());

    policy.on_put(&key("a"), "", &sized(60)).unwrap();
    clock.advance(Duration::from_secs(1));
    policy.on_put(&key("b"), "", &sized(60)).unwrap();
    policy.maybe_evict().unwrap();
    assert!(policy.is_denied(&key("a")));
    assert_eq!(policy.bytes_used(), 60);

    clock.advance(Duration::from_secs(1));
    policy.on_put(&key("a"), "", &sized(70)).unwrap();
    assert_eq!(policy.bytes_used(), 130);
    policy.maybe_evict().unwrap();
    assert!(policy.is_denied(&key("b")));
    assert_eq!(policy.bytes_used(), 70);

    clock.advance(Duration::from_secs(1));
    policy.on_put(&key("b"), "", &sized(60)).unwrap();
    policy.maybe_evict().unwrap();
    assert!(policy.is_denied(&key("a")));
    assert_eq!(policy.bytes_used(), 60);
    assert_eq!(policy.bytes_used(), policy.resident_bytes());
    assert_eq!(policy.evictions(), 3);
}

#[test]
fn test_missing_size_falls_back_to_value_length() {
    let clock = manual();
    let mut policy = LruBytePolicy::new(1_000, clock);
    policy.on_put(&key("a"), "twelve bytes", &PutMeta::new()).unwrap();
    assert_eq!(policy.bytes_used(), 12);
}

#[test]
fn test_on_hit_unknown_key_is_ignored() {
    let clock = manual();
    let mut policy = CostAwarePolicy::new(1_000, clock);
    policy.on_hit(&key("ghost"));
    assert_eq!(policy.tracked(), 0);
    assert!(policy.entry(&key("ghost")).is_none());
}

#[test]
fn test_noop_never_denies() {
    let mut policy = NoopPolicy::new();
    policy.on_put(&key("a"), "value", &sized(1 << 40)).unwrap();
    policy.on_hit(&key("a"));
    assert!(policy.maybe_evict().unwrap().victims.is_empty());
    assert!(!policy.is_denied(&key("a")));
    assert_eq!(policy.byte_budget(), None);
    assert_eq!(policy.evictions(), 0);
}

#[test]
fn test_factory() {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    for (name, kind) in [
        ("noop", PolicyKind::Noop),
        ("LRU", PolicyKind::LruByte),
        ("cost-aware", PolicyKind::CostAware),
    ] {
        let policy = create_eviction_policy(name, 100, clock.clone()).unwrap();
        assert_eq!(policy.kind(), kind);
    }
    assert!(create_eviction_policy("arc", 100, clock).is_err());
}

#[test]
fn test_policy_kind_round_trips_through_serde() {
    for kind in PolicyKind::ALL {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{kind}\""));
        let back: PolicyKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u64),
    Hit(u8),
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..12, 0u64..400).prop_map(|(k, s)| Op::Put(k, s)),
        (0u8..12).prop_map(Op::Hit),
        (0u64..5_000).prop_map(Op::Advance),
    ]
}

proptest! {
    #[test]
    fn prop_bytes_used_matches_resident_sizes(
        ops in prop::collection::vec(op_strategy(), 1..200),
        budget in 0u64..1_500,
        cost_aware in any::<bool>(),
    ) {
        let clock = manual();
        let kind = if cost_aware { PolicyKind::CostAware } else { PolicyKind::LruByte };
        let mut policy = kind.build(budget, clock.clone());

        for op in ops {
            match op {
                Op::Put(k, size) => {
                    let k = key(&format!("k{k}"));
                    policy
                        .on_put(&k, "", &PutMeta::new().with_size(size).with_saved_latency(size as f64))
                        .unwrap();
                    prop_assert!(!policy.is_denied(&k));
                    policy.maybe_evict().unwrap();
                    prop_assert!(policy.bytes_used() <= budget);
                }
                Op::Hit(k) => policy.on_hit(&key(&format!("k{k}"))),
                Op::Advance(ms) => clock.advance(Duration::from_millis(ms)),
            }
            prop_assert_eq!(policy.bytes_used(), policy.resident_bytes());
        }
        prop_assert!(policy.bytes_used() <= budget);
    }
}
