//! Project registry
//!
//! Durable catalog of registered projects. One in-process instance owns
//! `registry.json`; every mutation backs up the previous file and
//! atomically replaces the canonical one. Cross-process safety is a
//! documented non-goal.

use std::path::Path;
use std::sync::Mutex;

use gardener_domain::entities::{Project, RegistryState, TrainingStatus};
use gardener_domain::error::{Error, Result};
use gardener_domain::utils::{atomic_write_json, backup_path, copy_to_backup, read_json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DataRoot;

/// Content of `active_project.json`
#[derive(Debug, Serialize, Deserialize)]
struct ActiveProjectMarker {
    project_id: Option<String>,
}

/// Durable project catalog with atomic persistence
pub struct ProjectRegistry {
    paths: DataRoot,
    /// Exclusive around all state mutation and persistence
    state: Mutex<RegistryState>,
    load_warnings: Vec<String>,
}

impl ProjectRegistry {
    /// Open (or initialize) the registry under the data root.
    ///
    /// Load order: canonical file, then `.backup`, then an empty registry
    /// with a warning. A dangling active id is repaired on load.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the data root layout cannot be
    /// created.
    pub fn open(paths: DataRoot) -> Result<Self> {
        paths.ensure_layout()?;
        let registry_file = paths.registry_file();
        let mut warnings = Vec::new();

        let mut state = match load_state(&registry_file) {
            Ok(Some(state)) => state,
            Ok(None) => RegistryState::default(),
            Err(primary) => {
                warn!(error = %primary, "registry load failed, trying backup");
                warnings.push(format!("registry load failed ({primary}); used backup"));
                match load_state(&backup_path(&registry_file)) {
                    Ok(Some(state)) => state,
                    Ok(None) | Err(_) => {
                        warnings
                            .push("registry backup unusable; starting empty".to_owned());
                        warn!("registry backup unusable, initializing empty registry");
                        RegistryState::default()
                    }
                }
            }
        };
        warnings.extend(state.repair());

        Ok(Self {
            paths,
            state: Mutex::new(state),
            load_warnings: warnings,
        })
    }

    /// Warnings accumulated while loading (backup fallback, repairs).
    #[must_use]
    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    /// Register a new project for a source tree and persist.
    ///
    /// # Errors
    ///
    /// Returns a user error for invalid names/paths and a persistence
    /// error when the write fails.
    pub fn register(&self, name: &str, source_path: &Path) -> Result<Project> {
        let mut project = Project::new(name, source_path)?;
        project.vector_store_path = Some(self.paths.vector_store_dir(&project.id));

        let mut state = self.lock();
        if state.active_id.is_none() {
            state.active_id = Some(project.id.clone());
        }
        state.projects.insert(project.id.clone(), project.clone());
        self.persist(&state)?;
        self.mirror_metadata(&project);
        Ok(project)
    }

    /// Look up a project by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn get(&self, project_id: &str) -> Result<Project> {
        self.lock()
            .projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("project '{project_id}'")))
    }

    /// Find a project by its source path.
    #[must_use]
    pub fn find_by_source_path(&self, source_path: &Path) -> Option<Project> {
        self.lock()
            .projects
            .values()
            .find(|p| p.source_path == source_path)
            .cloned()
    }

    /// All projects, ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<Project> {
        self.lock().projects.values().cloned().collect()
    }

    /// Replace a project record and persist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and persistence errors on write
    /// failure.
    pub fn update(&self, project: Project) -> Result<()> {
        let mut state = self.lock();
        if !state.projects.contains_key(&project.id) {
            return Err(Error::not_found(format!("project '{}'", project.id)));
        }
        self.mirror_metadata(&project);
        state.projects.insert(project.id.clone(), project);
        self.persist(&state)
    }

    /// Update a project's training status and persist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and persistence errors on write
    /// failure.
    pub fn update_status(&self, project_id: &str, status: TrainingStatus) -> Result<()> {
        let mut state = self.lock();
        let project = state
            .projects
            .get_mut(project_id)
            .ok_or_else(|| Error::not_found(format!("project '{project_id}'")))?;
        project.training_status = status;
        project.touch();
        let snapshot = project.clone();
        self.mirror_metadata(&snapshot);
        self.persist(&state)
    }

    /// Remove a project, its directory, and reassign the active slot.
    ///
    /// Removing the active project moves the active slot to any remaining
    /// project, or to none when the registry empties.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and persistence errors on write
    /// failure.
    pub fn remove(&self, project_id: &str) -> Result<()> {
        let mut state = self.lock();
        if state.projects.remove(project_id).is_none() {
            return Err(Error::not_found(format!("project '{project_id}'")));
        }
        if state.active_id.as_deref() == Some(project_id) {
            state.active_id = state.projects.keys().next().cloned();
        }
        self.persist(&state)?;

        let dir = self.paths.project_dir(project_id);
        if dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!(project_id, error = %e, "failed to remove project directory");
            }
        }
        Ok(())
    }

    /// Set the active project.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and persistence errors on write
    /// failure.
    pub fn set_active(&self, project_id: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.projects.contains_key(project_id) {
            return Err(Error::not_found(format!("project '{project_id}'")));
        }
        state.active_id = Some(project_id.to_owned());
        self.persist(&state)
    }

    /// The active project, if any.
    #[must_use]
    pub fn get_active(&self) -> Option<Project> {
        let state = self.lock();
        state
            .active_id
            .as_ref()
            .and_then(|id| state.projects.get(id))
            .cloned()
    }

    /// Consistency check over the whole registry; returns findings.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let state = self.lock();
        let mut findings = Vec::new();
        if let Some(active) = &state.active_id {
            if !state.projects.contains_key(active) {
                findings.push(format!("active project '{active}' is not registered"));
            }
        }
        for project in state.projects.values() {
            if !project.source_path.exists() {
                findings.push(format!(
                    "project '{}' source path {} no longer exists",
                    project.name,
                    project.source_path.display()
                ));
            }
        }
        findings
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        // A poisoned registry mutex means a panic mid-mutation; continuing
        // with the inner state is safe because persistence is atomic.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Persist the registry and the active-project marker. Backs up the
    /// previous canonical file first; retries the write once.
    fn persist(&self, state: &RegistryState) -> Result<()> {
        let registry_file = self.paths.registry_file();
        copy_to_backup(&registry_file)?;

        if let Err(first) = atomic_write_json(&registry_file, state) {
            warn!(error = %first, "registry write failed, retrying once");
            atomic_write_json(&registry_file, state)?;
        }

        let marker = ActiveProjectMarker {
            project_id: state.active_id.clone(),
        };
        atomic_write_json(&self.paths.active_project_file(), &marker)
    }

    /// Best-effort `metadata.json` mirror next to the project's data.
    fn mirror_metadata(&self, project: &Project) {
        let path = self.paths.project_metadata_file(&project.id);
        if let Err(e) = atomic_write_json(&path, project) {
            warn!(project_id = %project.id, error = %e, "failed to mirror project metadata");
        }
    }
}

fn load_state(path: &Path) -> Result<Option<RegistryState>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}
