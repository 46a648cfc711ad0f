//! Embedding Provider Registry

use std::collections::BTreeMap;

/// Configuration for embedding provider creation
///
/// Carries every option a provider might need; providers use what they
/// need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingProviderConfig {
    /// Provider name (e.g. "ollama", "null")
    pub provider: String,
    /// Model name/identifier
    pub model: Option<String>,
    /// Base URL for HTTP providers
    pub base_url: Option<String>,
    /// Embedding dimensions (if configurable)
    pub dimensions: Option<usize>,
    /// Connect timeout in seconds for HTTP providers
    pub connect_timeout_secs: Option<u64>,
    /// Additional provider-specific configuration
    pub extra: BTreeMap<String, String>,
}

crate::impl_config_builder!(EmbeddingProviderConfig {
    /// Set the model name
    model: with_model(String),
    /// Set the base URL
    base_url: with_base_url(String),
    /// Set the embedding dimensions
    dimensions: with_dimensions(usize),
    /// Set the connect timeout
    connect_timeout_secs: with_connect_timeout_secs(u64),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::EmbeddingProvider,
    config_type: EmbeddingProviderConfig,
    entry_type: EmbeddingProviderEntry,
    slice_name: EMBEDDING_PROVIDERS,
    resolve_fn: resolve_embedding_provider,
    list_fn: list_embedding_providers
);
