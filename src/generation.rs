//! Generative language model boundary.
//!
//! [`GenerationClient`] is the seam the answer synthesizer generates
//! through; [`HttpGenerationClient`] speaks the remote service's JSON API.
//! Failures are *not* absorbed here — the synthesizer converts them into
//! inline error text, so this layer stays an honest `Result`.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

/// A client that produces a completion for a prompt.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// Generation client backed by the remote model service.
///
/// Calls `POST {url}/generate` with the configured model. If the
/// `GENERATION_API_KEY` environment variable is set, it is sent as a bearer
/// token.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpGenerationClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            model: config.model.clone(),
            api_key: std::env::var("GENERATION_API_KEY").ok(),
        })
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
        };

        let mut request = self
            .client
            .post(format!("{}/generate", self.url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            bail!("generation API error {}: {}", status, body_text);
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.text)
    }
}
