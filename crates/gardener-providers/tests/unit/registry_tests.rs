use gardener_domain::registry::adapter_runtime::{AdapterRuntimeConfig, resolve_adapter_runtime};
use gardener_domain::registry::embedding::{
    EmbeddingProviderConfig, list_embedding_providers, resolve_embedding_provider,
};
use gardener_domain::registry::llm::{LlmProviderConfig, resolve_llm_provider};
use gardener_domain::registry::vector_store::{VectorStoreConfig, resolve_vector_store};

#[test]
fn test_bundled_embedding_providers_registered() {
    let names: Vec<&str> = list_embedding_providers().into_iter().map(|(n, _)| n).collect();
    assert!(names.contains(&"null"));
    assert!(names.contains(&"ollama"));
}

#[test]
fn test_resolve_null_embedding() {
    let provider = resolve_embedding_provider(&EmbeddingProviderConfig::new("null"))
        .expect("resolve null provider");
    assert_eq!(provider.provider_name(), "null");
    assert_eq!(provider.dimensions(), 64);
}

#[test]
fn test_resolve_respects_dimension_override() {
    let config = EmbeddingProviderConfig::new("null").with_dimensions(128usize);
    let provider = resolve_embedding_provider(&config).expect("resolve");
    assert_eq!(provider.dimensions(), 128);
}

#[test]
fn test_resolve_unknown_provider_lists_known() {
    let err = match resolve_embedding_provider(&EmbeddingProviderConfig::new("missing")) {
        Ok(_) => panic!("expected unknown provider to be rejected"),
        Err(err) => err,
    };
    let message = err.to_string();
    assert!(message.contains("no registered provider matches 'missing'"));
    assert!(message.contains("null"));
}

#[test]
fn test_resolve_local_vector_store_requires_path() {
    let err = match resolve_vector_store(&VectorStoreConfig::new("local")) {
        Ok(_) => panic!("expected missing path to be rejected"),
        Err(err) => err,
    };
    assert!(err.to_string().contains("requires a storage path"));

    let config = VectorStoreConfig::new("local").with_path(std::env::temp_dir());
    let store = resolve_vector_store(&config).expect("resolve");
    assert_eq!(store.provider_name(), "local");
}

#[test]
fn test_resolve_ollama_llm() {
    let config = LlmProviderConfig::new("ollama")
        .with_host("http://localhost:11434")
        .with_model("llama3.2");
    let provider = resolve_llm_provider(&config).expect("resolve");
    assert_eq!(provider.provider_name(), "ollama");
}

#[test]
fn test_resolve_null_adapter_runtime() {
    let runtime =
        resolve_adapter_runtime(&AdapterRuntimeConfig::new("null")).expect("resolve");
    assert_eq!(runtime.runtime_name(), "null");
}
