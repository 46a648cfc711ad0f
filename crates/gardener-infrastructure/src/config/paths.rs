//! Data root layout
//!
//! Fixed sub-layout under the per-user data root:
//!
//! ```text
//! registry.json                  canonical project registry
//! registry.json.backup           prior good copy
//! active_project.json            {"project_id": ... | null}
//! base_models/                   optional base-model artifacts
//! projects/<project_id>/
//!   metadata.json                Project record mirror
//!   context.json                 conversation + analysis state
//!   vector_store/                vector index files
//!   adapter/                     adapter artifact + metrics.json
//!   training.log
//! logs/
//! ```

use std::path::{Path, PathBuf};

use gardener_domain::error::{Error, Result};

use super::data::{DATA_ROOT_DIR_NAME, Settings};

/// Canonical registry file name
pub const REGISTRY_FILENAME: &str = "registry.json";
/// Active project marker file name
pub const ACTIVE_PROJECT_FILENAME: &str = "active_project.json";

/// Resolved data root with the fixed sub-layout
#[derive(Debug, Clone)]
pub struct DataRoot {
    root: PathBuf,
}

impl DataRoot {
    /// Resolve the data root from settings, defaulting to
    /// `~/.codebase-gardener`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no home directory can be
    /// determined and settings carry no explicit root.
    pub fn resolve(settings: &Settings) -> Result<Self> {
        let root = match &settings.data_root {
            Some(root) => root.clone(),
            None => dirs::home_dir()
                .ok_or_else(|| Error::config("unable to determine the home directory"))?
                .join(DATA_ROOT_DIR_NAME),
        };
        Ok(Self { root })
    }

    /// Use an explicit root (tests, scratch setups).
    #[must_use]
    pub fn at(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the fixed directory layout.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when a directory cannot be created.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.base_models_dir(),
            self.projects_dir(),
            self.logs_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                Error::persistence_with_source(
                    format!("failed to create {}", dir.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// The data root itself.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `registry.json`
    #[must_use]
    pub fn registry_file(&self) -> PathBuf {
        self.root.join(REGISTRY_FILENAME)
    }

    /// `active_project.json`
    #[must_use]
    pub fn active_project_file(&self) -> PathBuf {
        self.root.join(ACTIVE_PROJECT_FILENAME)
    }

    /// `base_models/`
    #[must_use]
    pub fn base_models_dir(&self) -> PathBuf {
        self.root.join("base_models")
    }

    /// `projects/`
    #[must_use]
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// `logs/`
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// `projects/<id>/`
    #[must_use]
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.projects_dir().join(project_id)
    }

    /// `projects/<id>/metadata.json`
    #[must_use]
    pub fn project_metadata_file(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("metadata.json")
    }

    /// `projects/<id>/context.json`
    #[must_use]
    pub fn project_context_file(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("context.json")
    }

    /// `projects/<id>/vector_store/`
    #[must_use]
    pub fn vector_store_dir(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("vector_store")
    }

    /// Collection identifier handed to the vector store provider. The
    /// store is rooted at `projects/`, so the collection name carries the
    /// per-project subdirectory.
    #[must_use]
    pub fn vector_collection(project_id: &str) -> String {
        format!("{project_id}/vector_store")
    }

    /// `projects/<id>/adapter/`
    #[must_use]
    pub fn adapter_dir(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("adapter")
    }

    /// `projects/<id>/training.log`
    #[must_use]
    pub fn training_log_file(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("training.log")
    }
}
