//! Common utilities

/// Durable JSON file helpers
pub mod fs;

pub use fs::{atomic_write_json, backup_path, copy_to_backup, read_json};
