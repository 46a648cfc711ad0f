//! Source file and language detection entities
//!
//! `SourceFile` values are produced during discovery and are never
//! persisted; language detection is by extension only.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Languages the semantic chunker understands.
///
/// Files in any other language still flow through discovery and the
/// line-based fallback chunker, tagged [`Language::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// Python (`.py`)
    Python,
    /// JavaScript (`.js`, `.jsx`, `.mjs`)
    JavaScript,
    /// TypeScript (`.ts`, `.tsx`, `.d.ts`)
    TypeScript,
    /// Anything else
    Unknown,
}

impl Language {
    /// Detect the language of a file from its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        // `.d.ts` carries a double extension; Path::extension sees "ts",
        // which maps to the same language anyway.
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("py") => Self::Python,
            Some("js" | "jsx" | "mjs") => Self::JavaScript,
            Some("ts" | "tsx") => Self::TypeScript,
            _ => Self::Unknown,
        }
    }

    /// Whether the semantic chunker can parse this language.
    #[must_use]
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A file reported by discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Detected language
    pub language: Language,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub mtime: Option<DateTime<Utc>>,
}

impl SourceFile {
    /// Build a `SourceFile` from a path and filesystem metadata.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, mtime: Option<DateTime<Utc>>) -> Self {
        let language = Language::from_path(&path);
        Self {
            path,
            language,
            size,
            mtime,
        }
    }
}
