//! Ports
//!
//! Contracts between the core and everything replaceable: embedding
//! generation, vector storage, LLM inference, and the adapter runtime.
//! Implementations live in `gardener-providers`; the capability layer in
//! `gardener-infrastructure` decides at runtime which of them are live.

/// Tagged capability handles
pub mod capability;
pub use capability::Capability;

/// External provider ports
pub mod providers;
pub use providers::{
    AdapterRuntime, CompletionRequest, Embedding, EmbeddingProvider, LlmProvider, LoadedAdapter,
    MetadataFilter, MetadataMap, ProgressCallback, SearchHit, TrainingSpec, VectorRecord,
    VectorStoreProvider,
};
