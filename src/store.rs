//! Vector store abstraction.
//!
//! The [`VectorStore`] trait defines the two operations the pipeline needs —
//! batch upsert and top-k similarity query — enabling pluggable backends:
//!
//! - **[`HttpVectorStore`]** — a remote managed index, spoken to over its
//!   JSON API. Upsert is idempotent by id (re-upsert overwrites).
//! - **[`MemoryVectorStore`]** — in-process brute-force cosine similarity
//!   over a `HashMap`, for tests and single-node runs.
//!
//! Entries are owned by the store; the pipeline only ever sees the
//! `metadata.text` it put in at seed time, ranked by similarity.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;

/// The unit stored in and retrieved from the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: EntryMetadata,
}

/// Metadata carried alongside each vector. `text` is what retrieval hands
/// to the answer synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub text: String,
}

/// One similarity match: the entry's metadata text plus the store's score.
#[derive(Debug, Clone)]
pub struct ScoredText {
    pub text: String,
    pub score: f32,
}

/// Abstract vector index backend.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite entries by id, as one batch.
    async fn upsert(&self, entries: &[IndexedEntry]) -> Result<()>;

    /// Return up to `top_k` matches by descending similarity to `vector`,
    /// with their metadata.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredText>>;
}

/// Create the appropriate [`VectorStore`] based on configuration.
///
/// # Errors
///
/// Returns an error for unknown backend names or a missing `store.url`
/// (the latter is normally caught at config load).
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn VectorStore>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        "http" => Ok(Arc::new(HttpVectorStore::new(config)?)),
        other => bail!("Unknown store backend: '{}'. Must be http or memory.", other),
    }
}

// ============ HTTP store ============

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexedEntry],
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    score: f32,
    metadata: Option<EntryMetadata>,
}

/// Vector store backed by a remote managed index.
///
/// Calls `POST {url}/vectors/upsert` and `POST {url}/query`. If the
/// `VECTOR_STORE_API_KEY` environment variable is set, it is sent in the
/// `Api-Key` header.
pub struct HttpVectorStore {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpVectorStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let url = match config.url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => bail!("store.url must be set when store.backend is 'http'"),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            api_key: std::env::var("VECTOR_STORE_API_KEY").ok(),
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.post(format!("{}{}", self.url, path));
        if let Some(ref key) = self.api_key {
            request = request.header("Api-Key", key);
        }
        request
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn upsert(&self, entries: &[IndexedEntry]) -> Result<()> {
        let response = self
            .request("/vectors/upsert")
            .json(&UpsertRequest { vectors: entries })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("vector store upsert error {}: {}", status, body);
        }

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredText>> {
        let response = self
            .request("/query")
            .json(&QueryRequest {
                vector,
                top_k,
                include_metadata: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("vector store query error {}: {}", status, body);
        }

        let parsed: QueryResponse = response.json().await?;

        // Preserve the store's ordering; drop matches without metadata.
        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                m.metadata.map(|md| ScoredText {
                    text: md.text,
                    score: m.score,
                })
            })
            .collect())
    }
}

// ============ In-memory store ============

/// In-memory store: brute-force cosine similarity over all entries.
pub struct MemoryVectorStore {
    entries: RwLock<HashMap<String, IndexedEntry>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, entries: &[IndexedEntry]) -> Result<()> {
        let mut stored = self.entries.write().unwrap();
        for entry in entries {
            stored.insert(entry.id.clone(), entry.clone());
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredText>> {
        let stored = self.entries.read().unwrap();

        let mut scored: Vec<(String, ScoredText)> = stored
            .values()
            .map(|entry| {
                (
                    entry.id.clone(),
                    ScoredText {
                        text: entry.metadata.text.clone(),
                        score: cosine_similarity(vector, &entry.values),
                    },
                )
            })
            .collect();

        // Score desc, id asc (deterministic).
        scored.sort_by(|(id_a, a), (id_b, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(id_a.cmp(id_b))
        });
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, s)| s).collect())
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, values: Vec<f32>, text: &str) -> IndexedEntry {
        IndexedEntry {
            id: id.to_string(),
            values,
            metadata: EntryMetadata {
                text: text.to_string(),
            },
        }
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&[
                entry("a", vec![1.0, 0.0], "exact"),
                entry("b", vec![0.7, 0.7], "diagonal"),
                entry("c", vec![0.0, 1.0], "orthogonal"),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0], 3).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["exact", "diagonal", "orthogonal"]);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_query_respects_top_k() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&[
                entry("a", vec![1.0, 0.0], "one"),
                entry("b", vec![0.9, 0.1], "two"),
                entry("c", vec![0.8, 0.2], "three"),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&[entry("a", vec![1.0, 0.0], "first")])
            .await
            .unwrap();
        store
            .upsert(&[entry("a", vec![1.0, 0.0], "second")])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let results = store.query(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].text, "second");
    }

    #[tokio::test]
    async fn test_query_empty_store_returns_nothing() {
        let store = MemoryVectorStore::new();
        let results = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_create_store_rejects_unknown_backend() {
        let config = StoreConfig {
            backend: "redis".to_string(),
            ..StoreConfig::default()
        };
        assert!(create_store(&config).is_err());
    }
}
