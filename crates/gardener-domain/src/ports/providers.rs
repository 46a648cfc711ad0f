//! External Provider Ports
//!
//! Contracts for the services the pipeline composes: embedding generation,
//! vector storage, LLM inference, and the adapter runtime. All of them are
//! optional at runtime; the capability layer downgrades absences to
//! stand-ins instead of propagating construction failures.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::entities::{Chunk, TrainingMetrics, TrainingProgress};
use crate::error::Result;

// ============================================================================
// Embedding
// ============================================================================

/// A fixed-dimension embedding vector
pub type Embedding = Vec<f32>;

/// Text embedding generation port
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let embeddings = self.embed_batch(&[text.to_owned()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::Error::embedding("no embedding returned"))
    }

    /// Embed a batch of texts; the caller bounds batch size by byte budget.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    fn dimensions(&self) -> usize;

    fn provider_name(&self) -> &str;

    /// Cheap liveness probe used by the capability layer.
    async fn health_check(&self) -> Result<()> {
        self.embed("health check").await?;
        Ok(())
    }
}

// ============================================================================
// Vector store
// ============================================================================

/// String-keyed metadata attached to stored vectors
pub type MetadataMap = BTreeMap<String, String>;

/// Conjunction of equality predicates over vector metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataFilter(pub BTreeMap<String, String>);

impl MetadataFilter {
    /// Filter on a single field.
    #[must_use]
    pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(key.into(), value.into());
        Self(map)
    }

    /// Add another equality predicate.
    #[must_use]
    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Whether the given metadata satisfies every predicate.
    #[must_use]
    pub fn matches(&self, metadata: &MetadataMap) -> bool {
        self.0
            .iter()
            .all(|(k, v)| metadata.get(k).is_some_and(|m| m == v))
    }
}

/// One vector plus metadata, keyed by chunk id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub chunk_id: String,
    pub vector: Embedding,
    pub metadata: MetadataMap,
}

/// A ranked search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: String,
    /// Cosine similarity in `[-1, 1]`, higher is closer
    pub score: f32,
    pub metadata: MetadataMap,
}

/// Per-project nearest-neighbor index port
///
/// A collection is one project's index. Upserts become visible to readers
/// atomically at `commit`; the store owns exactly the set of chunk ids last
/// upserted minus those deleted.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    async fn create_collection(&self, collection: &str, dimensions: usize) -> Result<()>;

    async fn drop_collection(&self, collection: &str) -> Result<()>;

    /// Insert or replace records by chunk id.
    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<()>;

    async fn delete(&self, collection: &str, chunk_ids: &[String]) -> Result<()>;

    /// Ranked nearest neighbors: descending score, ties broken by
    /// lexicographic chunk id.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>>;

    async fn count(&self, collection: &str) -> Result<usize>;

    /// Chunk ids in the committed view, ascending.
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>>;

    /// Durably publish all writes since the previous commit.
    async fn commit(&self, collection: &str) -> Result<()>;

    fn provider_name(&self) -> &str;

    async fn health_check(&self) -> Result<()>;
}

// ============================================================================
// LLM inference
// ============================================================================

/// A completion request for the external model service
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Model override; providers fall back to their configured default
    pub model: Option<String>,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Text completion port over the local model endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion.
    ///
    /// Implementations surface connection failures as `LlmUnavailable` and
    /// deadline misses as `LlmTimeout`; both carry user-actionable text.
    async fn generate(&self, request: CompletionRequest) -> Result<String>;

    fn provider_name(&self) -> &str;

    async fn health_check(&self) -> Result<()>;
}

// ============================================================================
// Adapter runtime
// ============================================================================

/// A loaded low-rank adapter held by the dynamic loader
pub trait LoadedAdapter: Send + Sync {
    fn project_id(&self) -> &str;

    /// Estimated resident size in bytes, charged against the loader budget
    fn memory_bytes(&self) -> u64;

    /// Stand-in handles answer `true`; inference treats them as "no adapter"
    fn is_noop(&self) -> bool;
}

/// Everything the trainer needs for one job
#[derive(Clone)]
pub struct TrainingSpec {
    pub project_id: String,
    pub base_model: String,
    pub chunks: Vec<Chunk>,
    /// Directory the artifact and `metrics.json` are written into
    pub output_dir: PathBuf,
    /// Invoke the progress callback every this many steps
    pub progress_every: u64,
}

/// Progress callback invoked at step boundaries
pub type ProgressCallback = Arc<dyn Fn(TrainingProgress) + Send + Sync>;

/// Low-rank adapter training and loading port
///
/// The runtime is an external dependency whose absence is an expected
/// condition: resolution may yield a runtime whose operations all fail
/// with `CapabilityUnavailable`, and `load` may yield a no-op handle.
#[async_trait]
pub trait AdapterRuntime: Send + Sync {
    fn runtime_name(&self) -> &str;

    /// Estimate adapter memory before any allocation happens.
    async fn estimate_memory(&self, artifact: &Path) -> Result<u64>;

    /// Load an artifact into memory.
    async fn load(&self, project_id: &str, artifact: &Path) -> Result<Arc<dyn LoadedAdapter>>;

    /// Train an adapter, reporting progress and honoring cancellation at
    /// step boundaries.
    async fn train(
        &self,
        spec: TrainingSpec,
        progress: ProgressCallback,
        cancel: CancellationToken,
    ) -> Result<TrainingMetrics>;

    async fn health_check(&self) -> Result<()>;
}
