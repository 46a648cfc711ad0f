//! Null adapter runtime
//!
//! Stands in when no training library is installed. `load` hands back a
//! zero-cost no-op handle (inference treats it as "no adapter"), training
//! fails immediately with `CapabilityUnavailable`, and the health check
//! fails so the capability layer reports the training pipeline as off.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use gardener_domain::entities::TrainingMetrics;
use gardener_domain::error::{Error, Result};
use gardener_domain::ports::{AdapterRuntime, LoadedAdapter, ProgressCallback, TrainingSpec};
use gardener_domain::registry::adapter_runtime::{
    ADAPTER_RUNTIMES, AdapterRuntimeConfig, AdapterRuntimeEntry,
};
use tokio_util::sync::CancellationToken;

const UNAVAILABLE_REASON: &str = "no adapter training library is installed";

/// A handle that behaves as "no adapter" at inference time
pub struct NoopAdapterHandle {
    project_id: String,
}

impl NoopAdapterHandle {
    /// Create a no-op handle for a project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

impl LoadedAdapter for NoopAdapterHandle {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn memory_bytes(&self) -> u64 {
        0
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Adapter runtime used when the training library is absent
#[derive(Debug, Default)]
pub struct NullAdapterRuntime;

#[async_trait]
impl AdapterRuntime for NullAdapterRuntime {
    fn runtime_name(&self) -> &str {
        "null"
    }

    async fn estimate_memory(&self, _artifact: &Path) -> Result<u64> {
        Ok(0)
    }

    async fn load(&self, project_id: &str, _artifact: &Path) -> Result<Arc<dyn LoadedAdapter>> {
        // Callers must not be able to distinguish this from a successful
        // no-op, so load never fails here.
        Ok(Arc::new(NoopAdapterHandle::new(project_id)))
    }

    async fn train(
        &self,
        _spec: TrainingSpec,
        _progress: ProgressCallback,
        _cancel: CancellationToken,
    ) -> Result<TrainingMetrics> {
        Err(Error::capability("training_pipeline", UNAVAILABLE_REASON))
    }

    async fn health_check(&self) -> Result<()> {
        Err(Error::capability("training_pipeline", UNAVAILABLE_REASON))
    }
}

#[linkme::distributed_slice(ADAPTER_RUNTIMES)]
static NULL_RUNTIME: AdapterRuntimeEntry = AdapterRuntimeEntry {
    name: "null",
    summary: "No-op runtime for machines without a training library",
    build: |_config: &AdapterRuntimeConfig| Ok(std::sync::Arc::new(NullAdapterRuntime) as _),
};
