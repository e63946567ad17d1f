//! Metrics derived from per-policy event logs
//!
//! Format-only: nothing here feeds back into lookup or eviction decisions.

pub mod calculation;
mod summary;

pub use calculation::{hit_rate, mean, percentile, virtual_throughput};
pub use summary::{MetricsReporter, PolicySummary, RunSummary};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::PolicyRunner;
    use semcache_core::CacheKey;
    use semcache_eviction::NoopPolicy;

    fn runner_with_events() -> PolicyRunner {
        let mut runner = PolicyRunner::new("noop", "noop-tag", Box::new(NoopPolicy::new()));
        runner.record_miss(&CacheKey::from("a"), 1.0, 99.0);
        runner.record_hit(&CacheKey::from("a"), 2.0);
        runner.record_hit(&CacheKey::from("a"), 2.0);
        runner.record_miss(&CacheKey::from("b"), 1.0, 195.0);
        runner
    }

    #[test]
    fn test_policy_summary_from_runner() {
        let summary = MetricsReporter::summarize(&runner_with_events());
        assert_eq!(summary.requests, 4);
        assert_eq!(summary.hits, 2);
        assert_eq!(summary.misses, 2);
        assert_eq!(summary.hit_rate, 0.5);
        // sorted: 2, 2, 100, 196 and k = 1.5
        assert_eq!(summary.p50_ms, 51.0);
        assert_eq!(summary.mean_ms, 75.0);
        assert_eq!(summary.virtual_throughput, 4.0 / 0.3);
        assert_eq!(summary.evictions, 0);
    }

    #[test]
    fn test_empty_runner_summarizes_to_zero() {
        let runner = PolicyRunner::new("noop", "noop-tag", Box::new(NoopPolicy::new()));
        let summary = MetricsReporter::summarize(&runner);
        assert_eq!(summary.hit_rate, 0.0);
        assert_eq!(summary.p99_ms, 0.0);
        assert_eq!(summary.virtual_throughput, 0.0);
    }

    #[test]
    fn test_display_is_one_line() {
        let line = MetricsReporter::summarize(&runner_with_events()).to_string();
        assert!(line.starts_with("noop: n=4 hit_rate=50.00%"));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_run_summary_throughput() {
        let runners = vec![runner_with_events()];
        let run = MetricsReporter::summarize_run(&runners, 4, 1, 2000.0);
        assert_eq!(run.overall_throughput, 2.0);
        assert_eq!(run.skipped, 1);
        assert_eq!(run.policies.len(), 1);
    }
}
