//! One-time corpus seeding.
//!
//! Embeds a fixed reference corpus document-by-document — pausing between
//! calls to stay under the embedding provider's rate limit — then upserts
//! the whole batch into the vector store in one call. Deliberately
//! sequential: the pacing requires it.
//!
//! Upsert failure is reported as a structured error result, not raised;
//! embedding failures are absorbed upstream (the affected entries carry
//! synthetic vectors) and logged here.

use std::sync::Arc;
use std::time::Duration;

use crate::embedding::Embedder;
use crate::models::{Document, SeedReport};
use crate::store::{EntryMetadata, IndexedEntry, VectorStore};

/// The reference corpus. Ids are stable, so re-seeding overwrites in place.
pub fn seed_corpus() -> Vec<Document> {
    [
        (
            "doc1",
            "FastAPI is a modern, fast (high-performance), web framework for building APIs with Python 3.7+.",
        ),
        (
            "doc2",
            "Docker containers wrap up software and its dependencies into a standardized unit for software development.",
        ),
        (
            "doc3",
            "RAG (Retrieval-Augmented Generation) optimizes LLM output by referencing an authoritative knowledge base.",
        ),
        (
            "doc4",
            "Pinecone is a managed vector database that makes it easy to add vector search to production applications.",
        ),
    ]
    .into_iter()
    .map(|(id, text)| Document {
        id: id.to_string(),
        text: text.to_string(),
    })
    .collect()
}

/// Inter-call pacing policy for rate-limited providers.
///
/// Injectable so tests can run without wall-clock delays.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    delay: Duration,
}

impl Pacing {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No delay at all (tests, providers without rate limits).
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

pub struct Seeder {
    embedder: Embedder,
    store: Arc<dyn VectorStore>,
    pacing: Pacing,
}

impl Seeder {
    pub fn new(embedder: Embedder, store: Arc<dyn VectorStore>, pacing: Pacing) -> Self {
        Self {
            embedder,
            store,
            pacing,
        }
    }

    /// Embed and upsert the full corpus. Never fails outward.
    ///
    /// Re-running is idempotent: entries are keyed by document id and the
    /// store overwrites on upsert.
    pub async fn seed(&self) -> SeedReport {
        let documents = seed_corpus();
        let mut entries = Vec::with_capacity(documents.len());

        for (i, doc) in documents.iter().enumerate() {
            if i > 0 {
                self.pacing.pause().await;
            }

            tracing::info!(id = %doc.id, "embedding seed document");
            let (values, reason) = self.embedder.embed(&doc.text).await.into_parts();
            if let Some(reason) = reason {
                tracing::warn!(id = %doc.id, "seeding with synthetic vector: {}", reason);
            }

            entries.push(IndexedEntry {
                id: doc.id.clone(),
                values,
                metadata: EntryMetadata {
                    text: doc.text.clone(),
                },
            });
        }

        match self.store.upsert(&entries).await {
            Ok(()) => {
                tracing::info!(count = entries.len(), "seeding complete");
                SeedReport::seeded(entries.len())
            }
            Err(e) => {
                tracing::warn!("seeding upsert failed: {}", e);
                SeedReport::error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use crate::embedding::{EmbeddingClient, EMBEDDING_DIMS};
    use crate::store::{MemoryVectorStore, ScoredText};

    struct UnitClient;

    #[async_trait]
    impl EmbeddingClient for UnitClient {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let mut vector = vec![0.0f32; EMBEDDING_DIMS];
            vector[0] = 1.0;
            Ok(vector)
        }
    }

    struct RefusingStore;

    #[async_trait]
    impl VectorStore for RefusingStore {
        async fn upsert(&self, _entries: &[IndexedEntry]) -> Result<()> {
            bail!("index not found")
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<ScoredText>> {
            Ok(Vec::new())
        }
    }

    fn seeder(store: Arc<dyn VectorStore>) -> Seeder {
        Seeder::new(Embedder::new(Arc::new(UnitClient)), store, Pacing::none())
    }

    #[test]
    fn test_corpus_has_four_documents_with_unique_ids() {
        let corpus = seed_corpus();
        assert_eq!(corpus.len(), 4);
        let mut ids: Vec<&str> = corpus.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_seed_populates_store() {
        let store = Arc::new(MemoryVectorStore::new());
        let report = seeder(store.clone()).seed().await;

        assert!(!report.is_error());
        assert_eq!(report.count, Some(4));
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_seed_twice_is_idempotent() {
        let store = Arc::new(MemoryVectorStore::new());
        let seeder = seeder(store.clone());

        seeder.seed().await;
        let report = seeder.seed().await;

        assert_eq!(report.count, Some(4));
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_upsert_failure_reported_not_raised() {
        let report = seeder(Arc::new(RefusingStore)).seed().await;

        assert!(report.is_error());
        assert!(report.count.is_none());
        assert!(report.detail.unwrap().contains("index not found"));
    }
}
