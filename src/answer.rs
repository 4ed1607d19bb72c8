//! Answer synthesis: grounded prompt assembly and generation.
//!
//! The final pipeline stage. Retrieves context, builds a fixed-template
//! prompt around it, and invokes the generative model. Generation failures
//! become literal `"Error: ..."` answer text rather than propagating — the
//! pipeline never raises past this point, and the response is always
//! structurally complete.

use std::sync::Arc;
use std::time::Instant;

use crate::generation::GenerationClient;
use crate::models::AnswerResponse;
use crate::retrieval::Retriever;

/// Build the grounded prompt. Context and question are embedded verbatim.
fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful technical assistant.\n\
         Context: {}\n\
         Question: {}\n\
         Answer:",
        context, question
    )
}

pub struct AnswerPipeline {
    retriever: Retriever,
    generation: Arc<dyn GenerationClient>,
}

impl AnswerPipeline {
    pub fn new(retriever: Retriever, generation: Arc<dyn GenerationClient>) -> Self {
        Self {
            retriever,
            generation,
        }
    }

    /// Answer `question` from retrieved context. Never fails.
    ///
    /// `source_documents` carries whatever context the retriever produced
    /// (real or fallback), `degraded` whether any of it was substituted,
    /// and `processing_time` the elapsed wall-clock seconds.
    pub async fn answer(&self, question: &str) -> AnswerResponse {
        let start = Instant::now();

        let (documents, degraded_reason) = self.retriever.retrieve(question).await.into_parts();
        if let Some(ref reason) = degraded_reason {
            tracing::warn!("answering with substituted context: {}", reason);
        }

        let context = documents.join("\n");
        let prompt = build_prompt(&context, question);

        let answer = match self.generation.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => format!("Error: {}", e),
        };

        AnswerResponse {
            answer,
            source_documents: documents,
            processing_time: start.elapsed().as_secs_f64(),
            degraded: degraded_reason.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use crate::embedding::{Embedder, EmbeddingClient, EMBEDDING_DIMS};
    use crate::store::{EntryMetadata, IndexedEntry, MemoryVectorStore, VectorStore};

    struct UnitClient;

    #[async_trait]
    impl EmbeddingClient for UnitClient {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let mut vector = vec![0.0f32; EMBEDDING_DIMS];
            vector[0] = 1.0;
            Ok(vector)
        }
    }

    /// Records the prompt it was given and returns a canned answer.
    struct RecordingGeneration {
        prompt: Mutex<Option<String>>,
    }

    impl RecordingGeneration {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                prompt: Mutex::new(None),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompt.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl GenerationClient for RecordingGeneration {
        async fn generate(&self, prompt: &str) -> Result<String> {
            *self.prompt.lock().unwrap() = Some(prompt.to_string());
            Ok("a grounded answer".to_string())
        }
    }

    struct FailingGeneration;

    #[async_trait]
    impl GenerationClient for FailingGeneration {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            bail!("quota exceeded")
        }
    }

    async fn seeded_retriever() -> Retriever {
        let store = Arc::new(MemoryVectorStore::new());
        let mut values = vec![0.0f32; EMBEDDING_DIMS];
        values[0] = 1.0;
        store
            .upsert(&[IndexedEntry {
                id: "doc3".to_string(),
                values,
                metadata: EntryMetadata {
                    text: "RAG (Retrieval-Augmented Generation) optimizes LLM output..."
                        .to_string(),
                },
            }])
            .await
            .unwrap();
        Retriever::new(Embedder::new(Arc::new(UnitClient)), store, 2)
    }

    #[tokio::test]
    async fn test_prompt_embeds_context_and_question_verbatim() {
        let generation = RecordingGeneration::new();
        let pipeline = AnswerPipeline::new(seeded_retriever().await, generation.clone());

        let response = pipeline.answer("What is RAG?").await;

        assert_eq!(response.answer, "a grounded answer");
        assert_eq!(
            response.source_documents,
            vec!["RAG (Retrieval-Augmented Generation) optimizes LLM output...".to_string()]
        );

        let prompt = generation.last_prompt();
        assert!(prompt.contains("RAG (Retrieval-Augmented Generation) optimizes LLM output..."));
        assert!(prompt.contains("Question: What is RAG?"));
        assert!(prompt.starts_with("You are a helpful technical assistant."));
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_inline_error() {
        let pipeline = AnswerPipeline::new(seeded_retriever().await, Arc::new(FailingGeneration));

        let response = pipeline.answer("What is RAG?").await;

        assert!(response.answer.starts_with("Error:"));
        assert!(response.answer.contains("quota exceeded"));
        // The rest of the response is still intact.
        assert!(!response.source_documents.is_empty());
        assert!(response.processing_time >= 0.0);
    }

    #[tokio::test]
    async fn test_multiple_documents_joined_with_newlines() {
        let store = Arc::new(MemoryVectorStore::new());
        let mut closest = vec![0.0f32; EMBEDDING_DIMS];
        closest[0] = 1.0;
        let mut second = vec![0.0f32; EMBEDDING_DIMS];
        second[0] = 0.9;
        second[1] = 0.1;
        store
            .upsert(&[
                IndexedEntry {
                    id: "a".to_string(),
                    values: closest,
                    metadata: EntryMetadata {
                        text: "first context".to_string(),
                    },
                },
                IndexedEntry {
                    id: "b".to_string(),
                    values: second,
                    metadata: EntryMetadata {
                        text: "second context".to_string(),
                    },
                },
            ])
            .await
            .unwrap();
        let retriever = Retriever::new(Embedder::new(Arc::new(UnitClient)), store, 2);

        let generation = RecordingGeneration::new();
        let pipeline = AnswerPipeline::new(retriever, generation.clone());
        pipeline.answer("which context?").await;

        assert!(generation
            .last_prompt()
            .contains("first context\nsecond context"));
    }
}
