//! HTTP client for an Ollama-style `/api/generate` endpoint

use super::ModelEndpoint;
use async_trait::async_trait;
use semcache_core::{Error, Result, GENERATE_PATH};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Non-streaming generate client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::model_request(base_url, e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
            model: model.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::ModelTimeout {
                endpoint: self.url.clone(),
                duration: self.timeout,
            }
        } else {
            Error::model_request(&self.url, error.to_string())
        }
    }
}

#[async_trait]
impl ModelEndpoint for OllamaClient {
    fn describe(&self) -> String {
        format!("{} via {}", self.model, self.url)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_error(e))?
            .error_for_status()
            .map_err(|e| self.map_error(e))?;

        let body: GenerateResponse = response.json().await.map_err(|e| self.map_error(e))?;
        debug!(model = %self.model, bytes = body.response.len(), "model answered");
        Ok(body.response)
    }
}
