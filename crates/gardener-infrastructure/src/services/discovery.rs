//! File discovery
//!
//! Recursive traversal that tests directories against the exclusion set
//! before descent. Filtering after traversal is a catastrophic bug on
//! real trees (a single `node_modules` can dwarf the project), so the
//! exclusion gates the walk itself.

use std::path::Path;

use chrono::{DateTime, Utc};
use gardener_domain::entities::SourceFile;
use gardener_domain::error::{Error, Result};
use ignore::WalkBuilder;
use tracing::warn;

/// Directory names never descended into
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    "venv",
    ".venv",
    "env",
    "target",
    "build",
    "dist",
    ".cache",
    ".idea",
    ".vscode",
    "htmlcov",
    ".eggs",
];

/// Extensions treated as source files by default
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &[
    "py", "pyi", "js", "jsx", "mjs", "cjs", "ts", "tsx", "rs", "go", "java", "rb", "c", "h",
    "cpp", "hpp", "cc", "cs", "php", "swift", "kt", "scala", "sh",
];

/// Discovery parameters
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Extensions to include (lowercase, no dot)
    pub extensions: Vec<String>,
    /// Caller-supplied directory exclusions, on top of [`SKIP_DIRS`]
    pub exclude_dirs: Vec<String>,
    /// Invoke the progress callback every this many files
    pub progress_every: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_SOURCE_EXTENSIONS
                .iter()
                .map(|&e| e.to_owned())
                .collect(),
            exclude_dirs: Vec::new(),
            progress_every: 50,
        }
    }
}

/// Walk `root` and collect source files.
///
/// Directories whose name matches the exclusion set are never entered.
/// The progress callback receives the running file count every
/// `progress_every` files.
///
/// # Errors
///
/// Returns a user error when `root` is not an existing directory;
/// unreadable entries inside the tree are logged and skipped.
pub fn discover<F>(
    root: &Path,
    options: &DiscoveryOptions,
    mut progress: F,
) -> Result<Vec<SourceFile>>
where
    F: FnMut(usize),
{
    if !root.is_dir() {
        return Err(Error::user(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }

    let extensions: Vec<String> = options
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();
    let extra_excludes = options.exclude_dirs.clone();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .filter_entry(move |entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry.file_name().to_str().is_none_or(|name| {
                !SKIP_DIRS.contains(&name) && !extra_excludes.iter().any(|d| d == name)
            })
        })
        .build();

    let mut files = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "failed to read directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !has_included_extension(entry.path(), &extensions) {
            continue;
        }

        let (size, mtime) = match entry.metadata() {
            Ok(metadata) => (metadata.len(), system_mtime(&metadata)),
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to stat file");
                (0, None)
            }
        };
        files.push(SourceFile::new(entry.path().to_path_buf(), size, mtime));

        if options.progress_every > 0 && files.len() % options.progress_every == 0 {
            progress(files.len());
        }
    }
    Ok(files)
}

fn has_included_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_ascii_lowercase();
            extensions.iter().any(|e| *e == lower)
        })
}

fn system_mtime(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}
