//! Fair multi-policy comparison gateway for a semantic LLM response cache
//!
//! The gateway answers one prompt at a time while producing comparable
//! metrics for every configured eviction policy, as if each policy ran alone:
//!
//! 1. every policy looks the prompt up in its own backend context, with its
//!    denylist forcing misses for logically evicted keys
//! 2. if any policy missed, the model is called exactly once
//! 3. only the missing policies are backfilled and charged the model latency
//!
//! ## Modules
//!
//! - [`backend`]: the cache backend contract and an in-memory reference backend
//! - [`model`]: the model endpoint contract, an HTTP client and a synthetic model
//! - [`runner`]: per-policy state, counters and event log
//! - [`gateway`]: the fairness protocol
//! - [`metrics`]: percentile, hit rate and throughput summaries
//! - [`report`]: CSV and JSON output

pub mod backend;
pub mod gateway;
pub mod metrics;
pub mod model;
pub mod report;
pub mod runner;

pub use backend::{canonicalize, CacheBackend, ContextHandle, InMemoryBackend};
pub use gateway::{AskOutcome, LookupRecord, MultiPolicyGateway};
pub use metrics::{MetricsReporter, PolicySummary, RunSummary};
pub use model::{ModelEndpoint, OllamaClient, SyntheticModel, SyntheticSettings};
pub use runner::{LookupPath, PolicyRunner, RequestEvent};
