use super::calculation::{hit_rate, mean, percentile, virtual_throughput};
use crate::runner::PolicyRunner;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregated figures for one policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySummary {
    pub name: String,
    pub run_tag: String,
    pub requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub mean_ms: f64,
    pub evictions: u64,
    pub bytes_used: u64,
    pub virtual_throughput: f64,
}

impl fmt::Display for PolicySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: n={} hit_rate={:.2}% p50={:.1}ms p95={:.1}ms p99={:.1}ms evictions={} virtual_rps={:.2}",
            self.name,
            self.requests,
            self.hit_rate * 100.0,
            self.p50_ms,
            self.p95_ms,
            self.p99_ms,
            self.evictions,
            self.virtual_throughput,
        )
    }
}

/// Whole-run figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Prompts processed by every policy
    pub requests: u64,
    /// Prompts dropped after a model failure
    pub skipped: u64,
    pub wall_ms: f64,
    /// Processed prompts per wall-clock second
    pub overall_throughput: f64,
    pub policies: Vec<PolicySummary>,
}

/// Turns recorded runner state into summaries. Holds no state itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsReporter;

impl MetricsReporter {
    pub fn summarize(runner: &PolicyRunner) -> PolicySummary {
        let latencies = runner.latencies_ms();
        PolicySummary {
            name: runner.name().to_string(),
            run_tag: runner.run_tag().to_string(),
            requests: runner.requests(),
            hits: runner.hit_count(),
            misses: runner.miss_count(),
            hit_rate: hit_rate(runner.hit_count(), runner.requests()),
            p50_ms: percentile(latencies, 50.0),
            p95_ms: percentile(latencies, 95.0),
            p99_ms: percentile(latencies, 99.0),
            mean_ms: mean(latencies),
            evictions: runner.evictions(),
            bytes_used: runner.policy().bytes_used(),
            virtual_throughput: virtual_throughput(latencies),
        }
    }

    pub fn summarize_run(
        runners: &[PolicyRunner],
        requests: u64,
        skipped: u64,
        wall_ms: f64,
    ) -> RunSummary {
        let overall_throughput = if wall_ms > 0.0 {
            requests as f64 / (wall_ms / 1000.0)
        } else {
            0.0
        };
        RunSummary {
            requests,
            skipped,
            wall_ms,
            overall_throughput,
            policies: runners.iter().map(Self::summarize).collect(),
        }
    }
}
