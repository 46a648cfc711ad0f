//! Project entities and durable registry state
//!
//! A `Project` is a registered codebase with its own vector store, adapter,
//! and conversation context. The `RegistryState` document is the single
//! durable catalog of projects, atomically replaced on every mutation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Training lifecycle of a project's adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrainingStatus {
    /// No training has been attempted
    #[default]
    NotStarted,
    /// A training job is running
    Training,
    /// An adapter artifact exists on disk
    Completed,
    /// The last training attempt failed
    Failed,
}

/// A registered codebase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// UUIDv4 identity, unique within the registry
    pub id: String,
    /// Display name, non-empty and filesystem-safe
    pub name: String,
    /// Absolute path of the source tree
    pub source_path: PathBuf,
    /// Registration time
    pub created_at: DateTime<Utc>,
    /// Last analysis or training mutation
    pub last_updated: DateTime<Utc>,
    /// Adapter training lifecycle
    #[serde(default)]
    pub training_status: TrainingStatus,
    /// On-disk adapter artifact, if trained
    #[serde(default)]
    pub adapter_path: Option<PathBuf>,
    /// Per-project vector index directory
    #[serde(default)]
    pub vector_store_path: Option<PathBuf>,
}

impl Project {
    /// Register a new project for a source tree.
    ///
    /// # Errors
    ///
    /// Returns a user error when the name is empty after sanitization or
    /// the source path is not absolute.
    pub fn new(name: &str, source_path: &Path) -> Result<Self> {
        let name = sanitize_name(name);
        if name.is_empty() {
            return Err(Error::user("project name must contain at least one word character"));
        }
        if !source_path.is_absolute() {
            return Err(Error::user(format!(
                "project source path must be absolute, got '{}'",
                source_path.display()
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            source_path: source_path.to_path_buf(),
            created_at: now,
            last_updated: now,
            training_status: TrainingStatus::NotStarted,
            adapter_path: None,
            vector_store_path: None,
        })
    }

    /// Mark the project as touched by an analysis or training mutation.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

/// Reduce a display name to a filesystem-safe form.
///
/// Keeps word characters, `-` and `.`; collapses anything else to `-`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.trim().chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_owned()
}

/// Current on-disk schema version of [`RegistryState`]
pub const REGISTRY_VERSION: u32 = 1;

/// The single durable registry document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryState {
    /// Schema version for forward migration
    pub version: u32,
    /// All registered projects, keyed by id
    pub projects: BTreeMap<String, Project>,
    /// The active project, if any; always a key of `projects`
    #[serde(default)]
    pub active_id: Option<String>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            projects: BTreeMap::new(),
            active_id: None,
        }
    }
}

impl RegistryState {
    /// Check the active-id invariant, repairing a dangling reference.
    ///
    /// Returns the warnings produced while repairing.
    pub fn repair(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(active) = &self.active_id {
            if !self.projects.contains_key(active) {
                warnings.push(format!("active project '{active}' is not registered; clearing"));
                // Reassign to any remaining project rather than dropping to none
                // when possible, matching remove() semantics.
                self.active_id = self.projects.keys().next().cloned();
            }
        }
        warnings
    }
}
