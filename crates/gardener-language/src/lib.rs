//! # Language Support
//!
//! Tree-sitter based parsing and semantic chunking for the supported
//! source languages (Python, JavaScript, TypeScript). Everything here is
//! pure CPU work over in-memory text; file I/O and capability decisions
//! belong to the callers.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`parser`] | Grammar management and parse entry point |
//! | [`chunker`] | Semantic segmentation with size constraints |
//! | [`complexity`] | Structural complexity scoring |
//! | [`symbols`] | External reference extraction |

/// Semantic chunking
pub mod chunker;
/// Structural complexity scoring
pub mod complexity;
/// Parsing and chunking errors
pub mod error;
/// Tree-sitter parsing
pub mod parser;
/// Symbol reference extraction
pub mod symbols;

pub use chunker::{ChunkingOptions, SemanticChunker};
pub use error::{ParseError, Result};
pub use parser::SourceParser;
