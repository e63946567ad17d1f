//! Upstream model endpoints
//!
//! The gateway only depends on the request/response contract: a prompt in,
//! answer text out, and timeouts distinguishable from other failures.

mod ollama;
mod synthetic;

pub use ollama::OllamaClient;
pub use synthetic::{SyntheticModel, SyntheticSettings};

use async_trait::async_trait;
use semcache_core::Result;

/// A model that can answer prompts
#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    /// Human-readable identity for logs
    fn describe(&self) -> String;

    /// Produce an answer. Timeouts surface as `Error::ModelTimeout`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: ModelEndpoint + ?Sized> ModelEndpoint for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}
