use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub seeding: SeedingConfig,
}

/// Settings for the external embedding service.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_url() -> String {
    "http://localhost:8601".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// Settings for the vector store.
///
/// `backend = "http"` talks to a remote index at `url`; `backend = "memory"`
/// keeps everything in-process (single-node runs and tests).
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: None,
            top_k: default_top_k(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_store_backend() -> String {
    "memory".to_string()
}
fn default_top_k() -> usize {
    2
}

/// Settings for the generative language model service.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_url")]
    pub url: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            url: default_generation_url(),
            model: default_generation_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_generation_url() -> String {
    "http://localhost:8602".to_string()
}
fn default_generation_model() -> String {
    "gemini-2.5-flash".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Settings for the one-time seeding job.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedingConfig {
    /// Pause between embedding calls, to stay under the provider's rate limit.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            pause_ms: default_pause_ms(),
        }
    }
}

fn default_pause_ms() -> u64 {
    2000
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.store.top_k < 1 {
        anyhow::bail!("store.top_k must be >= 1");
    }

    match config.store.backend.as_str() {
        "memory" => {}
        "http" => {
            if config.store.url.as_deref().unwrap_or("").is_empty() {
                anyhow::bail!("store.url must be set when store.backend is 'http'");
            }
        }
        other => anyhow::bail!(
            "Unknown store backend: '{}'. Must be http or memory.",
            other
        ),
    }

    if config.embedding.timeout_secs == 0
        || config.store.timeout_secs == 0
        || config.generation.timeout_secs == 0
    {
        anyhow::bail!("timeout_secs must be > 0");
    }

    Ok(())
}
