//! Durable JSON file helpers
//!
//! Every durable document in the data root goes through the same
//! discipline: serialize to a sibling `.tmp` file, then rename over the
//! canonical path. A crash before the rename leaves the previous file
//! intact; a crash after it leaves the new one. Callers that keep a
//! `.backup` sibling copy it before rewriting.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Sibling temp path used during atomic writes.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// The `.backup` sibling of a canonical path.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".backup");
    path.with_file_name(name)
}

/// Write `value` as 2-space-indented UTF-8 JSON via temp file + rename.
///
/// # Errors
///
/// Returns a persistence error when serialization, the temp write, or the
/// rename fails; the canonical file is untouched in every failure case.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::persistence_with_source(
                format!("failed to create directory {}", parent.display()),
                e,
            )
        })?;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| {
        Error::persistence_with_source(format!("failed to write {}", tmp.display()), e)
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        // Leave no stray temp file behind on rename failure.
        let _ = fs::remove_file(&tmp);
        Error::persistence_with_source(
            format!("failed to replace {} atomically", path.display()),
            e,
        )
    })
}

/// Copy the canonical file to its `.backup` sibling, if it exists.
///
/// # Errors
///
/// Returns a persistence error when the copy fails.
pub fn copy_to_backup(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    fs::copy(path, backup_path(path)).map_err(|e| {
        Error::persistence_with_source(format!("failed to back up {}", path.display()), e)
    })?;
    Ok(())
}

/// Read and deserialize a JSON document.
///
/// # Errors
///
/// Returns the underlying I/O or JSON error; callers decide whether to
/// fall back to a backup.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
