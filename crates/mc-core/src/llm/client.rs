//! Ollama HTTP Client
//!
//! Talks to a local Ollama server using the non-streaming generate API.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::OllamaConfig;
use crate::error::{Error, Result};

use super::traits::LanguageModel;
use super::types::*;

/// Ollama API client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    options: GenerateOptions,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// Only validates the configuration; no request is sent.
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid Ollama base URL '{}': {}", config.base_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Unsupported scheme '{}' in Ollama base URL",
                url.scheme()
            )));
        }

        if config.model.trim().is_empty() {
            return Err(Error::Config("Model name must not be empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
            },
        })
    }

    /// Check that the server is reachable
    ///
    /// A model missing from the server's tag list is only logged, since
    /// Ollama can still pull it on first use.
    pub async fn check_connection(&self) -> Result<TagsResponse> {
        let url = format!("{}/api/tags", self.base_url);

        debug!("Checking Ollama server: {}", url);

        let response = self.client.get(&url).send().await.map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Ollama server check failed: {} - {}", status, body);
            return Err(Error::Ollama(format!("{}: {}", status, error_message(&body))));
        }

        let tags: TagsResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Ollama(format!("Failed to parse model list: {} - {}", e, body)))?;

        if tags.contains(&self.model) {
            info!("Ollama server reachable, model '{}' available", self.model);
        } else {
            warn!(
                "Model '{}' not found on Ollama server ({} models installed); run `ollama pull {}`",
                self.model,
                tags.models.len(),
                self.model
            );
        }

        Ok(tags)
    }

    /// Send a prompt to the generate API
    async fn send_generate_request(&self, prompt: &str) -> Result<GenerateResponse> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: self.options,
        };

        debug!("Sending request to Ollama: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Ollama API error: {} - {}", status, body);
            return Err(Error::Ollama(format!("{}: {}", status, error_message(&body))));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Ollama(format!("Failed to parse response: {} - {}", e, body)))
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let started = Instant::now();
        let parsed = self.send_generate_request(prompt).await?;

        info!(
            "Ollama response: model={}, elapsed={}ms, prompt_tokens={}, tokens={}",
            self.model,
            started.elapsed().as_millis(),
            parsed.prompt_eval_count.unwrap_or(0),
            parsed.eval_count.unwrap_or(0)
        );

        Ok(parsed.response)
    }
}

/// Extract the `error` field from an Ollama error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string())
}
