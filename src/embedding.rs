//! Embedding provider boundary and the never-failing adapter.
//!
//! [`HttpEmbeddingClient`] calls the external embedding service over its
//! JSON API. [`Embedder`] wraps any [`EmbeddingClient`] and converts every
//! failure — network error, quota error, malformed response — into a
//! synthetic vector, so the pipeline keeps functioning with zero real
//! embedding capacity. The tradeoff is availability over correctness:
//! similarity search over a synthetic vector is meaningless, and the
//! [`Outcome`] tag plus a warn log are how that substitution stays visible.
//!
//! No retry is attempted; a failed call is substituted in the same call.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::outcome::Outcome;

/// Dimensionality of every vector in the system, synthetic fallbacks
/// included, so downstream similarity search never sees a shape mismatch.
pub const EMBEDDING_DIMS: usize = 768;

/// Purpose marker sent with every embed call.
const TASK_TYPE: &str = "retrieval_query";

/// A client that converts text into a fixed-dimension vector.
///
/// Implementations may fail; [`Embedder`] is the layer that absorbs those
/// failures.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: &'a str,
    task_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding client backed by the remote embedding service.
///
/// Calls `POST {url}/embed` with the configured model. If the
/// `EMBEDDING_API_KEY` environment variable is set, it is sent as a bearer
/// token.
pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            model: config.model.clone(),
            api_key: std::env::var("EMBEDDING_API_KEY").ok(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = EmbedRequest {
            model: &self.model,
            content: text,
            task_type: TASK_TYPE,
        };

        let mut request = self
            .client
            .post(format!("{}/embed", self.url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            bail!("embedding API error {}: {}", status, body_text);
        }

        let parsed: EmbedResponse = response.json().await?;

        if parsed.embedding.len() != EMBEDDING_DIMS {
            bail!(
                "embedding API returned {} dimensions, expected {}",
                parsed.embedding.len(),
                EMBEDDING_DIMS
            );
        }

        Ok(parsed.embedding)
    }
}

/// Never-failing embedding adapter.
///
/// Wraps a fallible [`EmbeddingClient`] and always produces a 768-element
/// vector: the client's on success, a synthetic one on any failure.
#[derive(Clone)]
pub struct Embedder {
    client: Arc<dyn EmbeddingClient>,
}

impl Embedder {
    pub fn new(client: Arc<dyn EmbeddingClient>) -> Self {
        Self { client }
    }

    /// Embed `text`, substituting a synthetic vector on any client failure.
    ///
    /// The returned vector is always exactly [`EMBEDDING_DIMS`] long; a
    /// client response of the wrong shape is treated as a failure.
    pub async fn embed(&self, text: &str) -> Outcome<Vec<f32>> {
        match self.client.embed(text).await {
            Ok(vector) if vector.len() == EMBEDDING_DIMS => Outcome::Live(vector),
            Ok(vector) => {
                let reason = format!(
                    "embedding client returned {} dimensions, expected {}",
                    vector.len(),
                    EMBEDDING_DIMS
                );
                tracing::warn!("{}; substituting synthetic vector", reason);
                Outcome::degraded(synthetic_vector(), reason)
            }
            Err(e) => {
                let reason = format!("embedding request failed: {}", e);
                tracing::warn!("{}; substituting synthetic vector", reason);
                Outcome::degraded(synthetic_vector(), reason)
            }
        }
    }
}

/// A uniform random vector in [-0.1, 0.1] per component.
///
/// Shape-compatible with real embeddings, meaningless for similarity.
/// Random per call: two fallback embeddings of the same text differ.
fn synthetic_vector() -> Vec<f32> {
    (0..EMBEDDING_DIMS)
        .map(|_| fastrand::f32() * 0.2 - 0.1)
        .collect()
}
