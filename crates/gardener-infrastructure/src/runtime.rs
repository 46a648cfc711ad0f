//! Runtime wiring
//!
//! One value holds every subsystem, constructed once at startup and
//! passed explicitly. No globals, no singletons: the CLI owns a
//! `Runtime`, and everything the controller needs hangs off it.

use std::sync::Arc;

use gardener_domain::error::Result;

use crate::adapters::AdapterLoader;
use crate::capabilities::CapabilityRegistry;
use crate::config::{DataRoot, Settings};
use crate::context::ContextManager;
use crate::registry::ProjectRegistry;
use crate::services::AnalysisController;
use crate::training::Trainer;

/// The assembled system
pub struct Runtime {
    /// Resolved settings
    pub settings: Arc<Settings>,
    /// Data root layout
    pub paths: DataRoot,
    /// Capability directory
    pub capabilities: Arc<CapabilityRegistry>,
    /// Durable project catalog
    pub registry: Arc<ProjectRegistry>,
    /// Conversation contexts
    pub contexts: Arc<ContextManager>,
    /// Adapter cache
    pub loader: Arc<AdapterLoader>,
    /// Training coordinator
    pub trainer: Arc<Trainer>,
    /// The orchestrator
    pub controller: AnalysisController,
}

impl Runtime {
    /// Construct the whole system from settings.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from path resolution and persistence
    /// errors from creating the data-root layout or loading the registry.
    pub async fn bootstrap(settings: Settings) -> Result<Self> {
        if !gardener_providers::bundled_stack_ok() {
            tracing::warn!("bundled provider stack failed its construction smoke check");
        }

        let settings = Arc::new(settings);
        let paths = DataRoot::resolve(&settings)?;
        paths.ensure_layout()?;

        let capabilities = Arc::new(CapabilityRegistry::new(
            Arc::clone(&settings),
            paths.clone(),
        ));
        let registry = Arc::new(ProjectRegistry::open(paths.clone())?);
        let contexts = Arc::new(ContextManager::new(
            paths.clone(),
            settings.context.max_in_memory,
            settings.context.max_messages,
        ));

        let runtime_capability = capabilities.adapter_runtime().await;
        let loader = Arc::new(AdapterLoader::new(
            runtime_capability.clone(),
            settings.adapters.max_memory_bytes,
            settings.adapters.max_cached,
        ));
        let trainer = Arc::new(Trainer::new(
            runtime_capability,
            Arc::clone(&registry),
            paths.clone(),
            settings.adapters.progress_every,
        ));

        let controller = AnalysisController::new(
            Arc::clone(&settings),
            paths.clone(),
            Arc::clone(&capabilities),
            Arc::clone(&registry),
            Arc::clone(&contexts),
            Arc::clone(&loader),
            Arc::clone(&trainer),
        );

        Ok(Self {
            settings,
            paths,
            capabilities,
            registry,
            contexts,
            loader,
            trainer,
            controller,
        })
    }

    /// Flush resident state before exit.
    ///
    /// # Errors
    ///
    /// Returns the first context persistence failure.
    pub fn shutdown(&self) -> Result<()> {
        self.contexts.flush()
    }
}
