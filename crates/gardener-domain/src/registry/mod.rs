//! Provider Registry System
//!
//! Auto-registration for pluggable providers. Each family declares a
//! distributed slice; implementations in `gardener-providers` register
//! themselves at link time, and configuration selects one by name at
//! runtime. The capability layer sits above these registries and turns
//! resolution or health failures into stand-ins.

/// Adapter runtime registry
pub mod adapter_runtime;
/// Embedding provider registry
pub mod embedding;
/// LLM provider registry
pub mod llm;
/// Vector store provider registry
pub mod vector_store;

pub use adapter_runtime::{
    ADAPTER_RUNTIMES, AdapterRuntimeConfig, AdapterRuntimeEntry, list_adapter_runtimes,
    resolve_adapter_runtime,
};
pub use embedding::{
    EMBEDDING_PROVIDERS, EmbeddingProviderConfig, EmbeddingProviderEntry,
    list_embedding_providers, resolve_embedding_provider,
};
pub use llm::{LLM_PROVIDERS, LlmProviderConfig, LlmProviderEntry, list_llm_providers, resolve_llm_provider};
pub use vector_store::{
    VECTOR_STORES, VectorStoreConfig, VectorStoreEntry, list_vector_stores, resolve_vector_store,
};
