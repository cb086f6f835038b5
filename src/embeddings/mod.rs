//! Embeddings generation module
//!
//! Providers:
//! - OpenAI-compatible HTTP endpoints (text-embedding-ada-002 etc.)
//! - Ollama (local models)
//! - Hashed: deterministic token feature hashing, no network, used by tests
//!   and offline runs
//!
//! # Examples
//!
//! ```rust,no_run
//! use vedarag::config::AppConfig;
//! use vedarag::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.generate("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use crate::errors::Result;

/// Default embedding dimension for OpenAI text-embedding-ada-002
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// High level embedding service shared across the crate
pub struct EmbeddingService {
    client: EmbeddingClient,
    dimension: usize,
}

impl EmbeddingService {
    /// Create a service from configuration
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = match config.embeddings.provider.as_str() {
            "openai" => EmbeddingProvider::OpenAI,
            "ollama" => EmbeddingProvider::Ollama,
            "hashed" => EmbeddingProvider::Hashed,
            other => {
                return Err(crate::VedaRagError::Config(format!(
                    "Unknown embedding provider: {other}"
                )))
            }
        };

        let api_key = if config.embeddings.api_key.is_empty() {
            None
        } else {
            Some(config.embeddings.api_key.clone())
        };

        let client = EmbeddingClient::new(
            provider,
            config.embeddings.model.clone(),
            config.embeddings.endpoint.clone(),
            api_key,
            config.embeddings.dimension,
        )?;

        Ok(Self {
            client,
            dimension: config.embeddings.dimension,
        })
    }

    /// Create a deterministic offline service, used by tests
    pub fn hashed(dimension: usize) -> Self {
        Self {
            client: EmbeddingClient::hashed(dimension),
            dimension,
        }
    }

    /// Embedding dimension this service produces
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Generate embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        self.client.generate(text).await
    }

    /// Generate embeddings for multiple texts in batch
    pub async fn generate_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        self.client.generate_batch(texts).await
    }
}
