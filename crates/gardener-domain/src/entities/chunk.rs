//! Semantic code chunk entity
//!
//! A `Chunk` is the unit of ingestion and retrieval: a semantically
//! meaningful span of one source file with enough metadata to rank and
//! cite it. Chunks are transient in memory; the vector store is their
//! only durable home.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum_macros::Display;

use super::source_file::Language;

/// Kind of semantic boundary a chunk was cut at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChunkKind {
    /// A function or method body
    Function,
    /// A class definition
    Class,
    /// Top-level module code
    Module,
    /// A group of import statements
    Import,
    /// Line-bounded fallback for unstructured regions
    Block,
}

/// A semantic unit of source code with retrieval metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable id derived from (project, file, kind, start line)
    pub id: String,
    /// Owning project id
    pub project_id: String,
    /// Path of the source file, relative to the project root
    pub file_path: PathBuf,
    /// Language of the source file
    pub language: Language,
    /// Semantic boundary kind
    pub kind: ChunkKind,
    /// Byte range `[start, end)` within the file
    pub byte_start: usize,
    /// End of the byte range (exclusive)
    pub byte_end: usize,
    /// First line of the chunk (1-indexed)
    pub start_line: usize,
    /// Last line of the chunk (1-indexed, inclusive)
    pub end_line: usize,
    /// Structural complexity: nesting depth + branch count + size weight
    pub complexity: u32,
    /// Identifiers referenced but not defined within the chunk
    pub dependencies: Vec<String>,
    /// The chunk text itself
    pub text: String,
}

impl Chunk {
    /// Compute the stable chunk id.
    ///
    /// Ids deliberately exclude the chunk content so that re-ingesting an
    /// unchanged file reproduces the identical id set, and edits inside a
    /// chunk replace the stored vector under the same key.
    #[must_use]
    pub fn stable_id(
        project_id: &str,
        file_path: &Path,
        kind: ChunkKind,
        start_line: usize,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(project_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(file_path.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hasher.update(kind.to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(start_line.to_string().as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }

    /// Check the internal range invariants.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the byte range is empty or the
    /// line range is inconsistent with it.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.byte_end <= self.byte_start {
            return Err(crate::error::Error::invariant(format!(
                "chunk {} has empty byte range {}..{}",
                self.id, self.byte_start, self.byte_end
            )));
        }
        if self.start_line == 0 || self.end_line < self.start_line {
            return Err(crate::error::Error::invariant(format!(
                "chunk {} has inconsistent line range {}..{}",
                self.id, self.start_line, self.end_line
            )));
        }
        Ok(())
    }

    /// `file:start-end` citation tag used in chat prompts.
    #[must_use]
    pub fn citation(&self) -> String {
        format!(
            "{}:{}-{}",
            self.file_path.display(),
            self.start_line,
            self.end_line
        )
    }
}
