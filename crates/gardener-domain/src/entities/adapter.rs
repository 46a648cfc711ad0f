//! Adapter artifacts and training metrics

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metrics written next to an adapter artifact as `metrics.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Base model the adapter specializes
    pub base_model: String,
    /// Training steps completed
    pub steps: u64,
    /// Final training loss, if the runtime reports one
    #[serde(default)]
    pub final_loss: Option<f64>,
    /// Number of chunks the adapter was trained on
    pub chunk_count: usize,
    /// Wall-clock duration in seconds
    pub duration_secs: u64,
    /// Completion time
    pub trained_at: DateTime<Utc>,
    /// Estimated resident size when loaded, in bytes
    pub memory_bytes: u64,
}

/// An on-disk adapter produced by the trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterArtifact {
    /// Project the adapter specializes
    pub project_id: String,
    /// Base model id the artifact is compatible with
    pub base_model: String,
    /// Directory holding the artifact files
    pub artifact_path: PathBuf,
    /// Training metrics
    pub metrics: TrainingMetrics,
}

/// Progress report emitted by the trainer every few steps
#[derive(Debug, Clone, Copy)]
pub struct TrainingProgress {
    /// Steps completed so far
    pub step: u64,
    /// Total planned steps
    pub total_steps: u64,
    /// Most recent loss value, if any
    pub loss: Option<f64>,
}
