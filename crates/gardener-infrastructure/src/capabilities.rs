//! Component registry
//!
//! Runtime capability detection with graceful degradation. Provider
//! instances are constructed lazily (at most once per family, behind a
//! write lock) and failures downgrade to [`Capability::Unavailable`]
//! stand-ins instead of propagating. Availability verdicts are probed via
//! provider health checks and cached with a 5-minute TTL; composite
//! capabilities are available only when their whole dependency closure
//! is.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gardener_domain::entities::CapabilitySet;
use gardener_domain::ports::{
    AdapterRuntime, Capability, EmbeddingProvider, LlmProvider, VectorStoreProvider,
};
use gardener_domain::registry::adapter_runtime::{AdapterRuntimeConfig, resolve_adapter_runtime};
use gardener_domain::registry::embedding::{EmbeddingProviderConfig, resolve_embedding_provider};
use gardener_domain::registry::llm::{LlmProviderConfig, resolve_llm_provider};
use gardener_domain::registry::vector_store::{VectorStoreConfig, resolve_vector_store};
use moka::sync::Cache;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::{DataRoot, Settings};

/// Capability names
pub mod names {
    /// Durable project registry and layout
    pub const PROJECT_MANAGEMENT: &str = "project_management";
    /// AST-based chunking
    pub const SEMANTIC_CHUNKING: &str = "semantic_chunking";
    /// Embedding generation
    pub const EMBEDDING_GENERATION: &str = "embedding_generation";
    /// Vector storage
    pub const VECTOR_STORAGE: &str = "vector_storage";
    /// Nearest-neighbor search over embeddings
    pub const SEMANTIC_SEARCH: &str = "semantic_search";
    /// Retrieval-augmented chat context
    pub const RAG_RETRIEVAL: &str = "rag_retrieval";
    /// Adapter training
    pub const TRAINING_PIPELINE: &str = "training_pipeline";
}

/// Every capability the registry reports in `features()`
pub const ALL_CAPABILITIES: [&str; 7] = [
    names::PROJECT_MANAGEMENT,
    names::SEMANTIC_CHUNKING,
    names::EMBEDDING_GENERATION,
    names::VECTOR_STORAGE,
    names::SEMANTIC_SEARCH,
    names::RAG_RETRIEVAL,
    names::TRAINING_PIPELINE,
];

const VERDICT_TTL: Duration = Duration::from_secs(300);

/// Cached availability verdict
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Whether the capability is usable right now
    pub available: bool,
    /// Why not, when unavailable
    pub reason: Option<String>,
}

impl Verdict {
    fn ok() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
        }
    }
}

/// Lazy, thread-safe directory of named capabilities
pub struct CapabilityRegistry {
    settings: Arc<Settings>,
    paths: DataRoot,
    disabled: RwLock<HashSet<String>>,
    embedding: RwLock<Option<Capability<dyn EmbeddingProvider>>>,
    vector_store: RwLock<Option<Capability<dyn VectorStoreProvider>>>,
    llm: RwLock<Option<Capability<dyn LlmProvider>>>,
    adapter_runtime: RwLock<Option<Capability<dyn AdapterRuntime>>>,
    verdicts: Cache<String, Verdict>,
}

impl CapabilityRegistry {
    /// Create a registry over the given settings and data root.
    #[must_use]
    pub fn new(settings: Arc<Settings>, paths: DataRoot) -> Self {
        let disabled = settings
            .disabled_capabilities
            .iter()
            .cloned()
            .collect::<HashSet<_>>();
        Self {
            settings,
            paths,
            disabled: RwLock::new(disabled),
            embedding: RwLock::new(None),
            vector_store: RwLock::new(None),
            llm: RwLock::new(None),
            adapter_runtime: RwLock::new(None),
            verdicts: Cache::builder()
                .max_capacity(64)
                .time_to_live(VERDICT_TTL)
                .build(),
        }
    }

    /// Force a capability off (configuration override, tests).
    pub async fn disable(&self, name: &str) {
        self.disabled.write().await.insert(name.to_owned());
        self.verdicts.invalidate_all();
    }

    /// Drop cached availability and, for `Some(name)`, the cached provider
    /// instance of the family backing that capability.
    pub async fn invalidate(&self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.verdicts.invalidate(&name.to_owned());
                match name {
                    names::EMBEDDING_GENERATION => *self.embedding.write().await = None,
                    names::VECTOR_STORAGE => *self.vector_store.write().await = None,
                    names::TRAINING_PIPELINE => *self.adapter_runtime.write().await = None,
                    _ => {}
                }
            }
            None => {
                self.verdicts.invalidate_all();
                *self.embedding.write().await = None;
                *self.vector_store.write().await = None;
                *self.llm.write().await = None;
                *self.adapter_runtime.write().await = None;
            }
        }
    }

    /// The embedding provider capability. Construction happens at most
    /// once; resolution failures become stand-ins.
    pub async fn embedding(&self) -> Capability<dyn EmbeddingProvider> {
        if let Some(cap) = self.embedding.read().await.clone() {
            return cap;
        }
        let mut slot = self.embedding.write().await;
        if slot.is_none() {
            let mut config = EmbeddingProviderConfig::new(&self.settings.embedding.provider)
                .with_connect_timeout_secs(self.settings.llm.connect_timeout_secs);
            if let Some(model) = &self.settings.embedding.model {
                config = config.with_model(model.clone());
            }
            if let Some(dimensions) = self.settings.embedding.dimensions {
                config = config.with_dimensions(dimensions);
            }
            config.base_url = Some(self.settings.llm.host.clone());
            *slot = Some(resolve_capability("embedding", resolve_embedding_provider(&config)));
        }
        slot.clone().unwrap_or_else(|| Capability::unavailable("not resolved"))
    }

    /// The vector store capability, rooted at the projects directory.
    pub async fn vector_store(&self) -> Capability<dyn VectorStoreProvider> {
        if let Some(cap) = self.vector_store.read().await.clone() {
            return cap;
        }
        let mut slot = self.vector_store.write().await;
        if slot.is_none() {
            let config = VectorStoreConfig::new(&self.settings.vector_store.provider)
                .with_path(self.paths.projects_dir());
            *slot = Some(resolve_capability("vector store", resolve_vector_store(&config)));
        }
        slot.clone().unwrap_or_else(|| Capability::unavailable("not resolved"))
    }

    /// The LLM provider capability.
    pub async fn llm(&self) -> Capability<dyn LlmProvider> {
        if let Some(cap) = self.llm.read().await.clone() {
            return cap;
        }
        let mut slot = self.llm.write().await;
        if slot.is_none() {
            let config = LlmProviderConfig::new(&self.settings.llm.provider)
                .with_host(self.settings.llm.host.clone())
                .with_model(self.settings.llm.model.clone())
                .with_connect_timeout_secs(self.settings.llm.connect_timeout_secs)
                .with_request_timeout_secs(self.settings.llm.request_timeout_secs);
            *slot = Some(resolve_capability("LLM", resolve_llm_provider(&config)));
        }
        slot.clone().unwrap_or_else(|| Capability::unavailable("not resolved"))
    }

    /// The adapter runtime capability.
    pub async fn adapter_runtime(&self) -> Capability<dyn AdapterRuntime> {
        if let Some(cap) = self.adapter_runtime.read().await.clone() {
            return cap;
        }
        let mut slot = self.adapter_runtime.write().await;
        if slot.is_none() {
            let config = AdapterRuntimeConfig::new(&self.settings.adapters.runtime)
                .with_base_model(self.settings.adapters.base_model.clone());
            *slot = Some(resolve_capability(
                "adapter runtime",
                resolve_adapter_runtime(&config),
            ));
        }
        slot.clone().unwrap_or_else(|| Capability::unavailable("not resolved"))
    }

    /// Whether a named capability is available right now (cached).
    pub async fn is_available(&self, name: &str) -> bool {
        self.check(name).await.available
    }

    /// Availability verdict for a capability, honoring the dependency
    /// closure and the TTL cache.
    pub async fn check(&self, name: &str) -> Verdict {
        if self.disabled.read().await.contains(name) {
            return Verdict::unavailable("disabled by configuration");
        }
        match name {
            names::SEMANTIC_SEARCH | names::RAG_RETRIEVAL => {
                // Composite: available only when the whole closure is.
                let embedding = self.leaf_verdict(names::EMBEDDING_GENERATION).await;
                if !embedding.available {
                    return Verdict::unavailable(format!(
                        "requires embedding_generation: {}",
                        embedding.reason.as_deref().unwrap_or("unavailable")
                    ));
                }
                let storage = self.leaf_verdict(names::VECTOR_STORAGE).await;
                if !storage.available {
                    return Verdict::unavailable(format!(
                        "requires vector_storage: {}",
                        storage.reason.as_deref().unwrap_or("unavailable")
                    ));
                }
                Verdict::ok()
            }
            _ => self.leaf_verdict(name).await,
        }
    }

    /// Snapshot of every capability, for `features` and tier selection.
    pub async fn features(&self) -> CapabilitySet {
        let mut set = CapabilitySet {
            checked_at: Some(Utc::now()),
            ..CapabilitySet::default()
        };
        for name in ALL_CAPABILITIES {
            let verdict = self.check(name).await;
            set.features.insert(name.to_owned(), verdict.available);
            if let Some(reason) = verdict.reason {
                set.reasons.insert(name.to_owned(), reason);
            }
        }
        set
    }

    async fn leaf_verdict(&self, name: &str) -> Verdict {
        if self.disabled.read().await.contains(name) {
            return Verdict::unavailable("disabled by configuration");
        }
        if let Some(verdict) = self.verdicts.get(name) {
            return verdict;
        }
        let verdict = self.probe(name).await;
        debug!(capability = name, available = verdict.available, "availability probed");
        self.verdicts.insert(name.to_owned(), verdict.clone());
        verdict
    }

    async fn probe(&self, name: &str) -> Verdict {
        match name {
            names::PROJECT_MANAGEMENT => match self.paths.ensure_layout() {
                Ok(()) => Verdict::ok(),
                Err(e) => Verdict::unavailable(format!("data root not writable: {e}")),
            },
            // Grammars are bundled; chunking needs no external runtime.
            names::SEMANTIC_CHUNKING => Verdict::ok(),
            names::EMBEDDING_GENERATION => {
                probe_health("embedding provider", &self.embedding().await, |p| async move {
                    p.health_check().await
                })
                .await
            }
            names::VECTOR_STORAGE => {
                probe_health("vector store", &self.vector_store().await, |p| async move {
                    p.health_check().await
                })
                .await
            }
            names::TRAINING_PIPELINE => {
                probe_health("adapter runtime", &self.adapter_runtime().await, |p| async move {
                    p.health_check().await
                })
                .await
            }
            _ => Verdict::unavailable(format!("unknown capability '{name}'")),
        }
    }
}

fn resolve_capability<T: ?Sized>(
    family: &str,
    resolved: gardener_domain::error::Result<Arc<T>>,
) -> Capability<T> {
    match resolved {
        Ok(provider) => Capability::available(provider),
        Err(e) => {
            warn!(family, error = %e, "provider resolution failed, downgrading to stand-in");
            Capability::unavailable(e.to_string())
        }
    }
}

async fn probe_health<T, F, Fut>(family: &str, capability: &Capability<T>, check: F) -> Verdict
where
    T: ?Sized,
    F: FnOnce(Arc<T>) -> Fut,
    Fut: std::future::Future<Output = gardener_domain::error::Result<()>>,
{
    match capability {
        Capability::Available(provider) => match check(Arc::clone(provider)).await {
            Ok(()) => Verdict::ok(),
            Err(e) => Verdict::unavailable(format!("{family} health check failed: {e}")),
        },
        Capability::Unavailable { reason } => Verdict::unavailable(reason.clone()),
    }
}
