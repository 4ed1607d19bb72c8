//! # ragd
//!
//! A minimal retrieval-augmented answer service.
//!
//! ragd answers natural-language questions by embedding the question,
//! retrieving the most similar reference texts from a vector store, and
//! conditioning a generative language model on them. Every external
//! boundary degrades gracefully: a failed embedding call substitutes a
//! synthetic vector, a failed or empty retrieval substitutes fixed fallback
//! context, and a failed generation call surfaces as inline error text —
//! the pipeline never fails a request outright.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────┐
//! │ Embedder │──▶│ Retriever │──▶│ AnswerPipeline│
//! │ (remote) │   │ (vector   │   │ (remote LLM)  │
//! └────┬─────┘   │  store)   │   └──────────────┘
//!      │         └───────────┘
//!      │               ▲
//!      ▼               │
//! ┌──────────┐   ┌─────┴─────┐
//! │  Seeder  │──▶│VectorStore │
//! └──────────┘   └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ragd seed                     # populate the vector store
//! ragd ask "What is RAG?"       # one-shot question
//! ragd serve                    # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Boundary data types |
//! | [`outcome`] | Live-vs-degraded stage tagging |
//! | [`embedding`] | Embedding client and never-failing adapter |
//! | [`store`] | Vector store backends |
//! | [`retrieval`] | Similarity retrieval with fallback context |
//! | [`generation`] | Generative model client |
//! | [`answer`] | Prompt assembly and answer synthesis |
//! | [`seed`] | Corpus seeding batch job |
//! | [`server`] | HTTP server |

pub mod answer;
pub mod config;
pub mod embedding;
pub mod generation;
pub mod models;
pub mod outcome;
pub mod retrieval;
pub mod seed;
pub mod server;
pub mod store;
