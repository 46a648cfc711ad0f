//! Dynamic adapter loader
//!
//! Bounded cache of loaded low-rank adapters under a hard memory budget.
//! Admission is computed before any allocation: the estimate is checked
//! against the budget, LRU victims are evicted until headroom suffices,
//! and only then does the runtime load the artifact. When the runtime
//! itself is absent, `load` hands back a no-op stand-in callers cannot
//! distinguish from a successful no-op.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use gardener_domain::error::{Error, Result};
use gardener_domain::ports::{AdapterRuntime, Capability, LoadedAdapter};
use tokio::sync::Mutex;
use tracing::{debug, info};

struct CachedAdapter {
    handle: Arc<dyn LoadedAdapter>,
    bytes: u64,
}

struct LoaderState {
    entries: HashMap<String, CachedAdapter>,
    /// Least-recently-used first
    order: VecDeque<String>,
    active: Option<String>,
}

impl LoaderState {
    fn used_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.bytes).sum()
    }

    fn touch(&mut self, project_id: &str) {
        if let Some(pos) = self.order.iter().position(|id| id == project_id) {
            self.order.remove(pos);
        }
        self.order.push_back(project_id.to_owned());
    }
}

/// A stand-in handle used when the adapter runtime is unavailable
struct StandInAdapter {
    project_id: String,
}

impl LoadedAdapter for StandInAdapter {
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

/// LRU adapter cache under a hard memory budget
pub struct AdapterLoader {
    runtime: Capability<dyn AdapterRuntime>,
    budget_bytes: u64,
    max_cached: usize,
    /// Serializes load and evict; admission runs under this lock
    inner: Mutex<LoaderState>,
}

impl AdapterLoader {
    /// Create a loader over the given runtime capability.
    #[must_use]
    pub fn new(
        runtime: Capability<dyn AdapterRuntime>,
        budget_bytes: u64,
        max_cached: usize,
    ) -> Self {
        Self {
            runtime,
            budget_bytes,
            max_cached: max_cached.max(1),
            inner: Mutex::new(LoaderState {
                entries: HashMap::new(),
                order: VecDeque::new(),
                active: None,
            }),
        }
    }

    /// Load a project's adapter, evicting LRU entries as needed.
    ///
    /// Absent runtime: returns a no-op stand-in without touching the
    /// cache. Missing artifact: also a no-op stand-in (the project was
    /// never trained).
    ///
    /// # Errors
    ///
    /// Returns `ResourceExhausted` when the adapter cannot fit the budget
    /// even after evicting everything; the check happens before any
    /// allocation.
    pub async fn load(
        &self,
        project_id: &str,
        artifact: &Path,
    ) -> Result<Arc<dyn LoadedAdapter>> {
        let Some(runtime) = self.runtime.get() else {
            debug!(project_id, "adapter runtime unavailable, using stand-in");
            return Ok(self.stand_in(project_id).await);
        };
        if !artifact.exists() {
            debug!(project_id, "no adapter artifact on disk, using stand-in");
            return Ok(self.stand_in(project_id).await);
        }

        let mut state = self.inner.lock().await;

        if let Some(entry) = state.entries.get(project_id) {
            let handle = Arc::clone(&entry.handle);
            state.touch(project_id);
            state.active = Some(project_id.to_owned());
            return Ok(handle);
        }

        let estimate = runtime.estimate_memory(artifact).await?;
        if estimate > self.budget_bytes {
            return Err(Error::resource_exhausted(
                "adapter memory",
                estimate,
                self.budget_bytes,
            ));
        }

        // Evict until both the byte budget and the entry cap hold.
        while state.used_bytes() + estimate > self.budget_bytes
            || state.entries.len() >= self.max_cached
        {
            let Some(victim) = state.order.pop_front() else {
                return Err(Error::resource_exhausted(
                    "adapter memory",
                    estimate,
                    self.budget_bytes,
                ));
            };
            if state.entries.remove(&victim).is_some() {
                info!(project_id = %victim, "evicting least-recently-used adapter");
                if state.active.as_deref() == Some(victim.as_str()) {
                    state.active = None;
                }
            }
        }

        let handle = runtime.load(project_id, artifact).await?;
        state.entries.insert(
            project_id.to_owned(),
            CachedAdapter {
                handle: Arc::clone(&handle),
                bytes: estimate,
            },
        );
        state.touch(project_id);
        state.active = Some(project_id.to_owned());
        Ok(handle)
    }

    /// Run `f` against a project's adapter; if the adapter was not cached
    /// before the call, it is released again on exit.
    ///
    /// # Errors
    ///
    /// Propagates `load` failures.
    pub async fn with_adapter<F, T>(&self, project_id: &str, artifact: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&Arc<dyn LoadedAdapter>) -> T,
    {
        let was_cached = self.contains(project_id).await;
        let handle = self.load(project_id, artifact).await?;
        let out = f(&handle);
        if !was_cached {
            self.unload(project_id).await;
        }
        Ok(out)
    }

    /// Drop a cached adapter, if resident.
    pub async fn unload(&self, project_id: &str) {
        let mut state = self.inner.lock().await;
        state.entries.remove(project_id);
        state.order.retain(|id| id != project_id);
        if state.active.as_deref() == Some(project_id) {
            state.active = None;
        }
    }

    /// The most recently loaded project, if its adapter is still cached.
    pub async fn active(&self) -> Option<String> {
        self.inner.lock().await.active.clone()
    }

    /// Whether a project's adapter is cached.
    pub async fn contains(&self, project_id: &str) -> bool {
        self.inner.lock().await.entries.contains_key(project_id)
    }

    /// Sum of estimated bytes across cached adapters.
    pub async fn used_bytes(&self) -> u64 {
        self.inner.lock().await.used_bytes()
    }

    /// Number of cached adapters.
    pub async fn cached_count(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    async fn stand_in(&self, project_id: &str) -> Arc<dyn LoadedAdapter> {
        let mut state = self.inner.lock().await;
        state.active = Some(project_id.to_owned());
        Arc::new(StandInAdapter {
            project_id: project_id.to_owned(),
        })
    }
}
