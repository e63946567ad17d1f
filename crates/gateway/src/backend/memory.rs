//! Exact-match in-memory backend with per-run-tag stores

use super::{CacheBackend, ContextHandle};
use async_trait::async_trait;
use semcache_core::{Error, Result, RunTag};
use std::collections::HashMap;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// Normalize a prompt so trivially different spellings share one entry.
///
/// Applies NFKC, folds curly quotes and en/em dashes to ASCII, collapses
/// whitespace runs and trims.
pub fn canonicalize(prompt: &str) -> String {
    let folded: String = prompt
        .nfkc()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reference backend: one exact-match map per run tag.
///
/// It stands in for an external semantic store and performs no similarity
/// search; `similarity_max_distance` is only recorded.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    stores: HashMap<RunTag, HashMap<String, String>>,
    active: Option<ContextHandle>,
    generation: u64,
    contexts_created: u64,
    similarity_max_distance: f64,
}

impl InMemoryBackend {
    pub fn new(similarity_max_distance: f64) -> Self {
        Self {
            similarity_max_distance,
            ..Default::default()
        }
    }

    /// Drop a run tag's store so the next run starts cold
    pub fn reset(&mut self, run_tag: &RunTag) {
        if self.stores.remove(run_tag).is_some() {
            info!(run_tag = %run_tag, "reset cache context");
        }
        if self
            .active
            .as_ref()
            .is_some_and(|handle| handle.run_tag() == run_tag)
        {
            self.active = None;
        }
    }

    /// Number of real context switches performed
    pub fn activations(&self) -> u64 {
        self.generation
    }

    /// Number of stores built from scratch
    pub fn contexts_created(&self) -> u64 {
        self.contexts_created
    }

    /// Entries held for a run tag
    pub fn len(&self, run_tag: &RunTag) -> usize {
        self.stores.get(run_tag).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, run_tag: &RunTag) -> bool {
        self.len(run_tag) == 0
    }

    pub fn similarity_max_distance(&self) -> f64 {
        self.similarity_max_distance
    }

    fn check_active(&self, handle: &ContextHandle) -> Result<()> {
        match &self.active {
            Some(active) if active == handle => Ok(()),
            Some(active) => Err(Error::backend(
                handle.run_tag().as_str(),
                format!("stale context handle; active context is '{}'", active.run_tag()),
            )),
            None => Err(Error::backend(
                handle.run_tag().as_str(),
                "no active context",
            )),
        }
    }
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn activate(&mut self, run_tag: &RunTag) -> Result<ContextHandle> {
        if let Some(active) = &self.active {
            if active.run_tag() == run_tag {
                return Ok(active.clone());
            }
        }

        if !self.stores.contains_key(run_tag) {
            self.stores.insert(run_tag.clone(), HashMap::new());
            self.contexts_created += 1;
            debug!(run_tag = %run_tag, "created cache context");
        }
        self.generation += 1;
        let handle = ContextHandle::new(run_tag.clone(), self.generation);
        self.active = Some(handle.clone());
        Ok(handle)
    }

    async fn get(&self, handle: &ContextHandle, prompt: &str) -> Result<Option<String>> {
        self.check_active(handle)?;
        Ok(self
            .stores
            .get(handle.run_tag())
            .and_then(|store| store.get(&canonicalize(prompt)))
            .cloned())
    }

    async fn put(&mut self, handle: &ContextHandle, prompt: &str, answer: &str) -> Result<()> {
        self.check_active(handle)?;
        let store = self.stores.get_mut(handle.run_tag()).ok_or_else(|| {
            Error::backend(handle.run_tag().as_str(), "context has no store")
        })?;
        store.insert(canonicalize(prompt), answer.to_string());
        Ok(())
    }
}
