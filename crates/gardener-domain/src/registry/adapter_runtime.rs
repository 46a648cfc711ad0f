//! Adapter Runtime Registry
//!
//! The training library is an external dependency; the bundled "null"
//! runtime stands in when no real one is installed, and every operation
//! on it reports `CapabilityUnavailable`.

use std::collections::BTreeMap;

/// Configuration for adapter runtime creation
#[derive(Debug, Clone, Default)]
pub struct AdapterRuntimeConfig {
    /// Runtime name (e.g. "null")
    pub provider: String,
    /// Base model id adapters must be compatible with
    pub base_model: Option<String>,
    /// Additional runtime-specific configuration
    pub extra: BTreeMap<String, String>,
}

crate::impl_config_builder!(AdapterRuntimeConfig {
    /// Set the base model id
    base_model: with_base_model(String),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::AdapterRuntime,
    config_type: AdapterRuntimeConfig,
    entry_type: AdapterRuntimeEntry,
    slice_name: ADAPTER_RUNTIMES,
    resolve_fn: resolve_adapter_runtime,
    list_fn: list_adapter_runtimes
);
