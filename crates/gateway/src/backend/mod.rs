//! Cache backend contract
//!
//! A backend holds one store per run tag but serves only one of them at a
//! time. Callers must `activate` a context and pass the returned handle to
//! every `get`/`put`; a handle for a context that is no longer active is
//! rejected instead of silently reading another policy's store.

mod memory;

pub use memory::{canonicalize, InMemoryBackend};

use async_trait::async_trait;
use semcache_core::{Result, RunTag};

/// Proof that a run tag's context is the active one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextHandle {
    run_tag: RunTag,
    generation: u64,
}

impl ContextHandle {
    pub fn new(run_tag: RunTag, generation: u64) -> Self {
        Self {
            run_tag,
            generation,
        }
    }

    pub fn run_tag(&self) -> &RunTag {
        &self.run_tag
    }

    /// Activation counter value when this handle was issued
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Exact-or-similar lookup store sitting in front of the model
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Point subsequent operations at `run_tag`'s store.
    ///
    /// Re-activating the active tag must be a cheap no-op returning the
    /// current handle.
    async fn activate(&mut self, run_tag: &RunTag) -> Result<ContextHandle>;

    /// Look a prompt up in the handle's context
    async fn get(&self, handle: &ContextHandle, prompt: &str) -> Result<Option<String>>;

    /// Store an answer in the handle's context
    async fn put(&mut self, handle: &ContextHandle, prompt: &str, answer: &str) -> Result<()>;
}
