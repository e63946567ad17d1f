//! Eviction policy implementations

mod cost_aware;
mod lru_byte;
mod noop;

pub use cost_aware::{cost_score, CostAwarePolicy};
pub use lru_byte::LruBytePolicy;
pub use noop::NoopPolicy;
