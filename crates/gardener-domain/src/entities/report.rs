//! Analysis reports, capability sets, and tier selection
//!
//! The tier table is the one documented contract between codebase size,
//! capability availability, and pipeline depth; keep it in one place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Capability tier chosen for an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    /// Tiny tree or too few capabilities: whole-file blocks, no training
    Simple,
    /// Normal operation: chunking plus retrieval
    Standard,
    /// Large tree with the full stack: retrieval plus adapter training
    Advanced,
}

impl Tier {
    /// Select the tier for a codebase.
    ///
    /// | tier | criteria |
    /// |---|---|
    /// | simple | ≤ 5 files, or fewer than 3 capabilities |
    /// | standard | 6–100 files and ≥ 3 capabilities |
    /// | advanced | > 100 files and ≥ 5 capabilities |
    ///
    /// A large tree without the full capability set stays at standard.
    #[must_use]
    pub fn select(file_count: usize, available_capabilities: usize) -> Self {
        if file_count <= 5 || available_capabilities < 3 {
            Self::Simple
        } else if file_count > 100 && available_capabilities >= 5 {
            Self::Advanced
        } else {
            Self::Standard
        }
    }
}

/// Capabilities counted toward tier selection
pub const TIER_CAPABILITIES: [&str; 6] = [
    "rag_retrieval",
    "semantic_search",
    "training_pipeline",
    "project_management",
    "vector_storage",
    "embedding_generation",
];

/// Snapshot of feature availability
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CapabilitySet {
    /// feature name → availability
    pub features: BTreeMap<String, bool>,
    /// Unavailability reasons for the features that are off
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reasons: BTreeMap<String, String>,
    /// When the snapshot was taken
    pub checked_at: Option<DateTime<Utc>>,
}

impl CapabilitySet {
    /// Number of available features among the tier-counted set.
    #[must_use]
    pub fn tier_count(&self) -> usize {
        TIER_CAPABILITIES
            .iter()
            .filter(|name| self.features.get(**name).copied().unwrap_or(false))
            .count()
    }

    /// Whether a named feature is available.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }
}

/// A per-file ingestion failure recorded in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFailure {
    /// File the failure applies to
    pub path: String,
    /// What went wrong
    pub message: String,
}

/// Result of an `analyze` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Project the run belongs to
    pub project_id: String,
    /// Tier the controller selected
    pub tier: Tier,
    /// Files discovered (all languages, including unknown)
    pub file_count: usize,
    /// language name → file count
    pub language_histogram: BTreeMap<String, usize>,
    /// Chunks produced by the chunker
    pub chunk_count: usize,
    /// Chunks that received embeddings and were upserted
    pub embedded_count: usize,
    /// Whether an adapter training job was scheduled
    pub training_scheduled: bool,
    /// Degradation warnings accumulated during the run
    pub warnings: Vec<String>,
    /// Per-file ingestion failures (non-fatal)
    pub failures: Vec<IngestFailure>,
    /// Capability availability observed at run time
    pub capabilities: CapabilitySet,
    /// When the run completed
    pub completed_at: DateTime<Utc>,
}
