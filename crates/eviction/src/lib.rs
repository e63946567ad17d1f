//! Eviction policies for a semantic response cache
//!
//! Policies never delete anything from the backing store. Eviction is
//! logical: a victim is moved into the policy's denylist and every later
//! lookup for it is forced to miss until the key is written again.
//!
//! Three strategies are provided:
//! - [`NoopPolicy`]: no capacity limit, the control baseline
//! - [`LruBytePolicy`]: byte-budget LRU ordered by last access
//! - [`CostAwarePolicy`]: byte-budget eviction of the entries that save the
//!   least latency per stored byte

mod clock;
mod entry;
mod factory;
mod ledger;
mod policies;
mod traits;

// Re-export public API
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntryMeta, PutMeta};
pub use factory::{create_eviction_policy, PolicyKind};
pub use policies::{cost_score, CostAwarePolicy, LruBytePolicy, NoopPolicy};
pub use traits::{EvictionOutcome, EvictionPolicy};

#[cfg(test)]
mod tests;
