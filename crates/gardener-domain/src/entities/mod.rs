//! Domain Entities
//!
//! Core business entities of the gardener domain. Entities that are
//! persisted (projects, contexts, adapters) serialize to the JSON layout
//! described in the repository documentation; the rest are transient
//! in-memory values produced by discovery and ingestion.

/// Adapter artifacts and training metrics
pub mod adapter;
pub use adapter::{AdapterArtifact, TrainingMetrics, TrainingProgress};

/// Semantic code chunks
pub mod chunk;
pub use chunk::{Chunk, ChunkKind};

/// Per-project conversation history and analysis state
pub mod conversation;
pub use conversation::{ConversationMessage, MessageRole, ProjectContext};

/// Registered projects and the durable registry state
pub mod project;
pub use project::{Project, RegistryState, TrainingStatus};

/// Analysis reports, capability sets, and tier selection
pub mod report;
pub use report::{AnalysisReport, CapabilitySet, IngestFailure, TIER_CAPABILITIES, Tier};

/// Discovered source files and language detection
pub mod source_file;
pub use source_file::{Language, SourceFile};
