//! Newtype wrappers for cache keys and backend contexts

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display};
use std::ops::Deref;
use xxhash_rust::xxh3::xxh3_64;

/// Opaque key for a cached answer.
///
/// The gateway keys every policy's bookkeeping by the prompt text itself; the
/// key is ordered so that eviction tie-breaks are stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short stable fingerprint, used in log lines instead of full prompts
    pub fn fingerprint(&self) -> String {
        format!("{:016x}", xxh3_64(self.0.as_bytes()))
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for CacheKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a backing-store context (one per policy under comparison)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunTag(String);

impl RunTag {
    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RunTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for RunTag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for RunTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RunTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}
