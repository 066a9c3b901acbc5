//! Ollama backend implementation.
//!
//! Talks to a local Ollama server through its `/api/generate` endpoint.

use super::{ClientFactory, ModelService, ModelSettings, OutputFormat};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Builds [`OllamaBackend`]s bound to one Ollama host.
#[derive(Debug, Clone)]
pub struct OllamaFactory {
    host: String,
    timeout: Option<Duration>,
}

impl OllamaFactory {
    pub fn new(host: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.host.clone(), config.request_timeout())
    }
}

impl ClientFactory for OllamaFactory {
    type Handle = OllamaBackend;

    fn build(&self, settings: ModelSettings) -> Result<OllamaBackend> {
        OllamaBackend::new(settings, &self.host, self.timeout)
    }
}

/// Ollama backend for local LLM inference.
pub struct OllamaBackend {
    settings: ModelSettings,
    endpoint: Url,
    client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    ///
    /// No timeout is set unless one is given; generation can take arbitrarily long.
    pub fn new(settings: ModelSettings, host: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = format!("{}/api/generate", host.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid Ollama host URL: {}", host))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn request<'a>(&'a self, question: &'a str) -> OllamaRequest<'a> {
        let format = match (self.settings.output_format, self.settings.strict) {
            (OutputFormat::Json, true) => Some("json"),
            _ => None,
        };

        OllamaRequest {
            model: &self.settings.model,
            prompt: question,
            system: &self.settings.system_message,
            stream: false,
            format,
        }
    }
}

#[async_trait]
impl ModelService for OllamaBackend {
    async fn invoke(&self, question: &str) -> Result<String> {
        debug!("POST {} (model {})", self.endpoint, self.model());

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&self.request(question))
            .send()
            .await
            .context("Failed to connect to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Ollama request failed with status {}: {}",
                status,
                body
            ));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(ollama_response.response)
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}
