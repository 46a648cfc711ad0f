//! Adapter trainer
//!
//! Background training jobs with the state machine
//! `not_started → training → (completed | failed)`. The project registry
//! is the single source of truth for job state; the trainer only ever
//! moves it forward. Cancellation is cooperative at step boundaries via a
//! token the runtime checks between progress ticks.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use gardener_domain::entities::{Chunk, TrainingProgress, TrainingStatus};
use gardener_domain::error::{Error, Result};
use gardener_domain::ports::{AdapterRuntime, Capability, TrainingSpec};
use gardener_domain::utils::atomic_write_json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::DataRoot;
use crate::registry::ProjectRegistry;

struct JobHandle {
    cancel: CancellationToken,
    join: tokio::task::JoinHandle<()>,
}

/// Asynchronous adapter training coordinator
pub struct Trainer {
    runtime: Capability<dyn AdapterRuntime>,
    registry: Arc<ProjectRegistry>,
    paths: DataRoot,
    progress_every: u64,
    jobs: Mutex<HashMap<String, JobHandle>>,
}

impl Trainer {
    /// Create a trainer over the given runtime capability.
    #[must_use]
    pub fn new(
        runtime: Capability<dyn AdapterRuntime>,
        registry: Arc<ProjectRegistry>,
        paths: DataRoot,
        progress_every: u64,
    ) -> Self {
        Self {
            runtime,
            registry,
            paths,
            progress_every: progress_every.max(1),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule a training job for a project. Returns immediately; the
    /// job runs on a background worker.
    ///
    /// With no runtime installed the job completes immediately as
    /// `failed`, and the registry reflects it.
    ///
    /// # Errors
    ///
    /// Returns a user error when a job is already running for the project
    /// and propagates registry persistence failures.
    pub fn schedule(&self, project_id: &str, base_model: &str, chunks: Vec<Chunk>) -> Result<()> {
        {
            let jobs = self.lock_jobs();
            if jobs
                .get(project_id)
                .is_some_and(|job| !job.join.is_finished())
            {
                return Err(Error::user(format!(
                    "training already running for project '{project_id}'"
                )));
            }
        }

        self.registry.update_status(project_id, TrainingStatus::Training)?;

        let Some(runtime) = self.runtime.get() else {
            let reason = self
                .runtime
                .reason()
                .unwrap_or("adapter runtime unavailable")
                .to_owned();
            warn!(project_id, reason, "training pipeline unavailable, job failed");
            self.append_training_log(project_id, &format!("training failed: {reason}"));
            self.registry.update_status(project_id, TrainingStatus::Failed)?;
            return Ok(());
        };

        let spec = TrainingSpec {
            project_id: project_id.to_owned(),
            base_model: base_model.to_owned(),
            chunks,
            output_dir: self.paths.adapter_dir(project_id),
            progress_every: self.progress_every,
        };

        let cancel = CancellationToken::new();
        let job_cancel = cancel.clone();
        let registry = Arc::clone(&self.registry);
        let paths = self.paths.clone();
        let id = project_id.to_owned();

        let progress = progress_logger(&self.paths, project_id);

        let join = tokio::spawn(async move {
            let outcome = runtime.train(spec, progress, job_cancel).await;
            match outcome {
                Ok(metrics) => {
                    let metrics_file = paths.adapter_dir(&id).join("metrics.json");
                    if let Err(e) = atomic_write_json(&metrics_file, &metrics) {
                        warn!(project_id = %id, error = %e, "failed to write training metrics");
                    }
                    match registry.get(&id) {
                        Ok(mut project) => {
                            project.adapter_path = Some(paths.adapter_dir(&id));
                            project.training_status = TrainingStatus::Completed;
                            project.touch();
                            if let Err(e) = registry.update(project) {
                                warn!(project_id = %id, error = %e, "failed to record training completion");
                            }
                        }
                        Err(e) => warn!(project_id = %id, error = %e, "trained project vanished"),
                    }
                    info!(project_id = %id, steps = metrics.steps, "adapter training completed");
                }
                Err(e) => {
                    warn!(project_id = %id, error = %e, "adapter training failed");
                    if let Err(e) = registry.update_status(&id, TrainingStatus::Failed) {
                        warn!(project_id = %id, error = %e, "failed to record training failure");
                    }
                }
            }
        });

        self.lock_jobs().insert(
            project_id.to_owned(),
            JobHandle { cancel, join },
        );
        Ok(())
    }

    /// Request cooperative cancellation. Returns whether a job was
    /// running; the status moves to `failed` when the runtime honors the
    /// token at the next step boundary.
    #[must_use]
    pub fn cancel(&self, project_id: &str) -> bool {
        let jobs = self.lock_jobs();
        match jobs.get(project_id) {
            Some(job) if !job.join.is_finished() => {
                job.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Whether a job is currently running for the project.
    #[must_use]
    pub fn is_running(&self, project_id: &str) -> bool {
        self.lock_jobs()
            .get(project_id)
            .is_some_and(|job| !job.join.is_finished())
    }

    /// Wait for a project's job to finish (tests and shutdown).
    pub async fn wait(&self, project_id: &str) {
        let join = {
            let mut jobs = self.lock_jobs();
            jobs.remove(project_id).map(|job| job.join)
        };
        if let Some(join) = join {
            let _ = join.await;
        }
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobHandle>> {
        self.jobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn append_training_log(&self, project_id: &str, line: &str) {
        append_log_line(&self.paths, project_id, line);
    }
}

/// Progress callback that appends ticks to `training.log`.
fn progress_logger(
    paths: &DataRoot,
    project_id: &str,
) -> Arc<dyn Fn(TrainingProgress) + Send + Sync> {
    let paths = paths.clone();
    let id = project_id.to_owned();
    Arc::new(move |progress: TrainingProgress| {
        let loss = progress
            .loss
            .map_or_else(|| "-".to_owned(), |l| format!("{l:.4}"));
        append_log_line(
            &paths,
            &id,
            &format!(
                "step {}/{} loss {loss}",
                progress.step, progress.total_steps
            ),
        );
    })
}

fn append_log_line(paths: &DataRoot, project_id: &str, line: &str) {
    let file = paths.training_log_file(project_id);
    if let Some(parent) = file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let entry = format!("[{}] {line}\n", Utc::now().to_rfc3339());
    let result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&file)
        .and_then(|mut f| f.write_all(entry.as_bytes()));
    if let Err(e) = result {
        warn!(project_id, error = %e, "failed to append to training log");
    }
}
