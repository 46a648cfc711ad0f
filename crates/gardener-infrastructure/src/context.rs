//! Project context manager
//!
//! In-memory LRU of per-project conversation contexts with write-through
//! persistence. The manager owns every `ProjectContext`: it may evict,
//! but an evicted context is always persisted first, and a failed persist
//! never drops in-memory state.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use gardener_domain::entities::{ConversationMessage, MessageRole, ProjectContext};
use gardener_domain::error::{Error, Result};
use gardener_domain::utils::{atomic_write_json, read_json};
use tracing::{debug, warn};

use crate::config::DataRoot;

struct LruState {
    contexts: HashMap<String, ProjectContext>,
    /// Least-recently-used first
    order: VecDeque<String>,
}

/// LRU cache of project contexts with write-through persistence
pub struct ContextManager {
    paths: DataRoot,
    capacity: usize,
    max_messages: usize,
    /// Guards the LRU and per-project append order
    inner: Mutex<LruState>,
}

impl ContextManager {
    /// Create a manager holding at most `capacity` contexts in memory and
    /// retaining at most `max_messages` messages per project.
    #[must_use]
    pub fn new(paths: DataRoot, capacity: usize, max_messages: usize) -> Self {
        Self {
            paths,
            capacity: capacity.max(1),
            max_messages: max_messages.max(1),
            inner: Mutex::new(LruState {
                contexts: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Fetch a project's context, loading from disk or creating it empty.
    /// Marks the context most-recently-used and may evict the LRU victim
    /// (persisted first).
    ///
    /// # Errors
    ///
    /// Returns a persistence error only when an eviction victim cannot be
    /// persisted; the requested context is still returned on a later call.
    pub fn get(&self, project_id: &str) -> Result<ProjectContext> {
        let mut inner = self.lock();
        if !inner.contexts.contains_key(project_id) {
            let loaded = self.load_or_create(project_id);
            inner.contexts.insert(project_id.to_owned(), loaded);
            inner.order.push_back(project_id.to_owned());
            self.evict_over_capacity(&mut inner)?;
        }
        touch(&mut inner.order, project_id);
        Ok(inner
            .contexts
            .get(project_id)
            .cloned()
            .unwrap_or_else(|| ProjectContext::new(project_id)))
    }

    /// Append a message and persist the context.
    ///
    /// Over the retention cap, the oldest non-system messages are dropped
    /// first. A failed persist is surfaced as a persistence error, but the
    /// in-memory append is kept either way.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the write-through fails.
    pub fn add_message(
        &self,
        project_id: &str,
        role: MessageRole,
        content: &str,
        metadata: Option<BTreeMap<String, String>>,
    ) -> Result<()> {
        let mut message = ConversationMessage::new(role, content);
        if let Some(metadata) = metadata {
            message.metadata = metadata;
        }

        let mut inner = self.lock();
        if !inner.contexts.contains_key(project_id) {
            let loaded = self.load_or_create(project_id);
            inner.contexts.insert(project_id.to_owned(), loaded);
            inner.order.push_back(project_id.to_owned());
            self.evict_over_capacity(&mut inner)?;
        }
        touch(&mut inner.order, project_id);

        let max_messages = self.max_messages;
        let snapshot = {
            let context = inner
                .contexts
                .get_mut(project_id)
                .ok_or_else(|| Error::invariant("context vanished under lock"))?;
            context.push_bounded(message, max_messages);
            context.clone()
        };

        self.persist(&snapshot)
    }

    /// Last `n` messages of a project, chronological.
    ///
    /// # Errors
    ///
    /// Propagates eviction persistence failures from the implicit load.
    pub fn recent(&self, project_id: &str, n: usize) -> Result<Vec<ConversationMessage>> {
        Ok(self.get(project_id)?.recent(n).to_vec())
    }

    /// Set one scratch analysis-state entry and persist.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the write-through fails.
    pub fn set_state(
        &self,
        project_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<()> {
        let mut inner = self.lock();
        if !inner.contexts.contains_key(project_id) {
            let loaded = self.load_or_create(project_id);
            inner.contexts.insert(project_id.to_owned(), loaded);
            inner.order.push_back(project_id.to_owned());
            self.evict_over_capacity(&mut inner)?;
        }
        touch(&mut inner.order, project_id);

        let snapshot = {
            let context = inner
                .contexts
                .get_mut(project_id)
                .ok_or_else(|| Error::invariant("context vanished under lock"))?;
            context.analysis_state.insert(key.to_owned(), value);
            context.clone()
        };
        self.persist(&snapshot)
    }

    /// Erase a project's context in memory and on disk.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the on-disk file cannot be
    /// removed.
    pub fn clear(&self, project_id: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.contexts.remove(project_id);
        inner.order.retain(|id| id != project_id);

        let file = self.paths.project_context_file(project_id);
        if file.exists() {
            std::fs::remove_file(&file).map_err(|e| {
                Error::persistence_with_source(
                    format!("failed to remove {}", file.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Persist every resident context (shutdown flush).
    ///
    /// # Errors
    ///
    /// Returns the first persistence failure; remaining contexts are still
    /// attempted.
    pub fn flush(&self) -> Result<()> {
        let inner = self.lock();
        let mut first_error = None;
        for context in inner.contexts.values() {
            if let Err(e) = self.persist(context) {
                warn!(project_id = %context.project_id, error = %e, "context flush failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of contexts currently resident in memory.
    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.lock().contexts.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruState> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn load_or_create(&self, project_id: &str) -> ProjectContext {
        let file = self.paths.project_context_file(project_id);
        if file.exists() {
            match read_json::<ProjectContext>(&file) {
                Ok(context) => return context,
                Err(e) => {
                    warn!(project_id, error = %e, "context file unreadable, starting empty");
                }
            }
        }
        ProjectContext::new(project_id)
    }

    fn evict_over_capacity(&self, inner: &mut LruState) -> Result<()> {
        while inner.contexts.len() > self.capacity {
            let Some(victim_id) = inner.order.pop_front() else {
                break;
            };
            if let Some(victim) = inner.contexts.remove(&victim_id) {
                debug!(project_id = %victim_id, "evicting LRU project context");
                // Persist before the memory copy disappears.
                self.persist(&victim)?;
            }
        }
        Ok(())
    }

    fn persist(&self, context: &ProjectContext) -> Result<()> {
        let file = self.paths.project_context_file(&context.project_id);
        if let Err(first) = atomic_write_json(&file, context) {
            warn!(project_id = %context.project_id, error = %first, "context write failed, retrying once");
            atomic_write_json(&file, context)?;
        }
        Ok(())
    }
}

fn touch(order: &mut VecDeque<String>, project_id: &str) {
    if let Some(pos) = order.iter().position(|id| id == project_id) {
        order.remove(pos);
    }
    order.push_back(project_id.to_owned());
}
