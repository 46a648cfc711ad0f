//! # Providers
//!
//! Concrete implementations of the domain's provider ports. Every
//! provider self-registers into its family's distributed slice, and
//! configuration selects one by name at runtime:
//!
//! | Family | Bundled providers |
//! |--------|-------------------|
//! | Embedding | `ollama`, `null` |
//! | Vector store | `local` |
//! | LLM | `ollama`, `null` |
//! | Adapter runtime | `null` |
//!
//! Linking this crate is what populates the registries; the binary depends
//! on it even though it rarely names these types directly.

/// Adapter runtimes
pub mod adapter;
/// Embedding providers
pub mod embedding;
/// LLM inference providers
pub mod llm;
/// Vector store providers
pub mod vector_store;

pub use adapter::{NoopAdapterHandle, NullAdapterRuntime};
pub use embedding::{NullEmbeddingProvider, OllamaEmbeddingProvider};
pub use llm::{NullLlmProvider, OllamaLlmProvider};
pub use vector_store::LocalVectorStore;

/// Startup smoke check: every bundled provider constructs.
///
/// The registries live in `gardener-domain`, but the registration entries
/// sit next to the provider types in this crate; calling this from the
/// composition root also keeps each provider object in the final link.
pub fn bundled_stack_ok() -> bool {
    use gardener_domain::registry::embedding::EmbeddingProviderConfig;
    use gardener_domain::registry::llm::LlmProviderConfig;

    let _ = NullEmbeddingProvider::default();
    let _ = NullLlmProvider;
    let _ = NullAdapterRuntime;
    let _ = LocalVectorStore::new(std::path::PathBuf::new());

    OllamaEmbeddingProvider::from_config(&EmbeddingProviderConfig::new("ollama")).is_ok()
        && OllamaLlmProvider::from_config(&LlmProviderConfig::new("ollama")).is_ok()
}
