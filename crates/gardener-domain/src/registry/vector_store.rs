//! Vector Store Provider Registry

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for vector store creation
#[derive(Debug, Clone, Default)]
pub struct VectorStoreConfig {
    /// Provider name (e.g. "local")
    pub provider: String,
    /// Root directory for file-backed stores
    pub path: Option<PathBuf>,
    /// Additional provider-specific configuration
    pub extra: BTreeMap<String, String>,
}

crate::impl_config_builder!(VectorStoreConfig {
    /// Set the storage root directory
    path: with_path(PathBuf),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::VectorStoreProvider,
    config_type: VectorStoreConfig,
    entry_type: VectorStoreEntry,
    slice_name: VECTOR_STORES,
    resolve_fn: resolve_vector_store,
    list_fn: list_vector_stores
);
