//! LLM Provider Registry

use std::collections::BTreeMap;

/// Configuration for LLM provider creation
#[derive(Debug, Clone, Default)]
pub struct LlmProviderConfig {
    /// Provider name (e.g. "ollama")
    pub provider: String,
    /// Endpoint host, e.g. `http://localhost:11434`
    pub host: Option<String>,
    /// Default model name
    pub model: Option<String>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
    /// Overall request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Additional provider-specific configuration
    pub extra: BTreeMap<String, String>,
}

crate::impl_config_builder!(LlmProviderConfig {
    /// Set the endpoint host
    host: with_host(String),
    /// Set the default model
    model: with_model(String),
    /// Set the connect timeout
    connect_timeout_secs: with_connect_timeout_secs(u64),
    /// Set the request timeout
    request_timeout_secs: with_request_timeout_secs(u64),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::LlmProvider,
    config_type: LlmProviderConfig,
    entry_type: LlmProviderEntry,
    slice_name: LLM_PROVIDERS,
    resolve_fn: resolve_llm_provider,
    list_fn: list_llm_providers
);
