//! Null embedding provider
//!
//! Deterministic pseudo-embeddings derived from a content hash. Useful as
//! the degraded-mode embedder and in tests: identical text always maps to
//! the identical vector, and distinct texts land far apart with high
//! probability, so nearest-neighbor behavior stays meaningful.

use async_trait::async_trait;
use gardener_domain::error::Result;
use gardener_domain::ports::{Embedding, EmbeddingProvider};
use gardener_domain::registry::embedding::{
    EMBEDDING_PROVIDERS, EmbeddingProviderConfig, EmbeddingProviderEntry,
};
use sha2::{Digest, Sha256};

/// Default vector width of the null provider
pub const NULL_EMBEDDING_DIMENSIONS: usize = 64;

/// Hash-based embedding provider with no external dependencies
pub struct NullEmbeddingProvider {
    dimensions: usize,
}

impl Default for NullEmbeddingProvider {
    fn default() -> Self {
        Self::new(NULL_EMBEDDING_DIMENSIONS)
    }
}

impl NullEmbeddingProvider {
    /// Create a provider with the given vector width.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let mut vector = Vec::with_capacity(self.dimensions);
        let mut counter: u32 = 0;
        while vector.len() < self.dimensions {
            let mut hasher = Sha256::new();
            hasher.update(counter.to_le_bytes());
            hasher.update(text.as_bytes());
            let digest = hasher.finalize();
            for pair in digest.chunks_exact(2) {
                if vector.len() == self.dimensions {
                    break;
                }
                let raw = u16::from_le_bytes([pair[0], pair[1]]);
                // Map to [-1, 1]
                vector.push(f32::from(raw) / f32::from(u16::MAX) * 2.0 - 1.0);
            }
            counter += 1;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "null"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static NULL_EMBEDDING: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "null",
    summary: "Deterministic hashed pseudo-embeddings, no runtime required",
    build: |config: &EmbeddingProviderConfig| {
        Ok(std::sync::Arc::new(NullEmbeddingProvider::new(
            config.dimensions.unwrap_or(NULL_EMBEDDING_DIMENSIONS),
        )) as _)
    },
};
