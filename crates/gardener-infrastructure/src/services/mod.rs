//! Services
//!
//! The orchestration layer: discovery, ingestion, prompt assembly, the
//! analysis controller, and Markdown export.

/// Analysis controller
pub mod analysis;
/// File discovery
pub mod discovery;
/// Markdown export
pub mod export;
/// Ingestion pipeline
pub mod ingest;
/// Prompt assembly
pub mod prompt;

pub use analysis::{AnalysisController, AnalysisMode};
pub use discovery::{DEFAULT_SOURCE_EXTENSIONS, DiscoveryOptions, SKIP_DIRS, discover};
pub use ingest::{IngestOutcome, IngestPipeline};
