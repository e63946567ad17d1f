//! Factory for creating eviction policies

use crate::clock::Clock;
use crate::policies::{CostAwarePolicy, LruBytePolicy, NoopPolicy};
use crate::traits::EvictionPolicy;
use semcache_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The closed set of eviction strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    #[serde(rename = "noop")]
    Noop,
    #[serde(rename = "lru", alias = "lru-byte")]
    LruByte,
    #[serde(rename = "costaware", alias = "cost-aware")]
    CostAware,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Noop, PolicyKind::LruByte, PolicyKind::CostAware];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Noop => "noop",
            PolicyKind::LruByte => "lru",
            PolicyKind::CostAware => "costaware",
        }
    }

    /// Build a fresh policy instance of this kind
    pub fn build(self, byte_budget: u64, clock: Arc<dyn Clock>) -> Box<dyn EvictionPolicy> {
        match self {
            PolicyKind::Noop => Box::new(NoopPolicy::new()),
            PolicyKind::LruByte => Box::new(LruBytePolicy::new(byte_budget, clock)),
            PolicyKind::CostAware => Box::new(CostAwarePolicy::new(byte_budget, clock)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "noop" | "none" => Ok(PolicyKind::Noop),
            "lru" | "lru-byte" | "lru_byte" => Ok(PolicyKind::LruByte),
            "costaware" | "cost-aware" | "cost_aware" => Ok(PolicyKind::CostAware),
            _ => Err(Error::InvalidPolicy {
                name: s.to_string(),
            }),
        }
    }
}

/// Eviction policy factory
pub fn create_eviction_policy(
    policy_type: &str,
    byte_budget: u64,
    clock: Arc<dyn Clock>,
) -> Result<Box<dyn EvictionPolicy>> {
    let kind = policy_type.parse::<PolicyKind>()?;
    Ok(kind.build(byte_budget, clock))
}
