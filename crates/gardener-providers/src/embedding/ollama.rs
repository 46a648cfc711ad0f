//! Ollama embedding provider
//!
//! Talks to the `/api/embeddings` endpoint of a local Ollama instance.
//! Availability is dynamic: the capability layer health-checks this
//! provider and downgrades embedding generation to a stand-in when the
//! endpoint is unreachable.

use std::time::Duration;

use async_trait::async_trait;
use gardener_domain::error::{Error, Result};
use gardener_domain::ports::{Embedding, EmbeddingProvider};
use gardener_domain::registry::embedding::{
    EMBEDDING_PROVIDERS, EmbeddingProviderConfig, EmbeddingProviderEntry,
};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";
const DEFAULT_DIMENSIONS: usize = 768;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// HTTP embedding provider backed by Ollama
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddingProvider {
    /// Build a provider from registry configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the HTTP client cannot be built.
    pub fn from_config(config: &EmbeddingProviderConfig) -> Result<Self> {
        let connect_timeout = Duration::from_secs(
            config
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        );
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            dimensions: config.dimensions.unwrap_or(DEFAULT_DIMENSIONS),
        })
    }

    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbeddingsRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| Error::embedding(format!("embedding request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "embedding endpoint returned {}",
                response.status()
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("invalid embedding response: {e}")))?;

        if body.embedding.is_empty() {
            return Err(Error::embedding("embedding endpoint returned an empty vector"));
        }
        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        // The endpoint embeds one prompt per call; the caller already
        // bounds batch size by byte budget.
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_one(text).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static OLLAMA_EMBEDDING: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "ollama",
    summary: "Ollama /api/embeddings over local HTTP",
    build: |config: &EmbeddingProviderConfig| {
        OllamaEmbeddingProvider::from_config(config)
            .map(|p| std::sync::Arc::new(p) as _)
            .map_err(|e| e.to_string())
    },
};
