//! Retrieval engine: question in, grounding texts out.
//!
//! Embeds the question, queries the vector store for the nearest entries,
//! and extracts their metadata text in the store's similarity order. When
//! the store call fails or returns nothing, a fixed two-sentence fallback
//! is substituted so the answer synthesizer always receives non-empty
//! context. A store failure and an empty result take the same fallback;
//! the [`Outcome`] reason distinguishes them.

use std::sync::Arc;

use crate::embedding::Embedder;
use crate::outcome::Outcome;
use crate::store::VectorStore;

/// Context substituted when the store fails or holds nothing relevant.
pub fn fallback_context() -> Vec<String> {
    vec![
        "FastAPI is a web framework.".to_string(),
        "Docker is for containers.".to_string(),
    ]
}

pub struct Retriever {
    embedder: Embedder,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Embedder, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Return the texts of the entries most similar to `question`, in
    /// descending-similarity order.
    ///
    /// Always yields a non-empty sequence and never fails: a store error or
    /// empty result substitutes [`fallback_context`], and a synthetic
    /// question embedding marks otherwise-real results as degraded (they
    /// were ranked against a meaningless vector).
    pub async fn retrieve(&self, question: &str) -> Outcome<Vec<String>> {
        let (vector, embed_reason) = self.embedder.embed(question).await.into_parts();

        let texts = match self.store.query(&vector, self.top_k).await {
            Ok(matches) => Ok(matches.into_iter().map(|m| m.text).collect::<Vec<_>>()),
            Err(e) => {
                tracing::warn!("vector store query failed: {}", e);
                Err(format!("vector store query failed: {}", e))
            }
        };

        match texts {
            Err(reason) => Outcome::degraded(fallback_context(), reason),
            Ok(texts) if texts.is_empty() => {
                Outcome::degraded(fallback_context(), "vector store returned no matches")
            }
            Ok(texts) => match embed_reason {
                Some(reason) => Outcome::degraded(texts, reason),
                None => Outcome::Live(texts),
            },
        }
    }
}
