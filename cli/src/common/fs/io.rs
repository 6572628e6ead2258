//! # zfpack Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! This module centralizes fundamental filesystem input/output operations
//! required by the packaging stages. It provides thin wrappers around `std::fs`
//! that attach the offending path to every error.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: Creates a directory (and parents) if missing, and rejects paths that exist as something other than a directory.
//! - **`read_file_to_string`**: `fs::read_to_string` with path context.
//! - **`write_string_to_file`**: Writes a string, creating the parent directory first.
//! - **`remove_dir_tolerant`**: Best-effort recursive delete that keeps going past entries it cannot remove.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(&staging.join("config/autoload"))?;
//! let descriptor = io::read_file_to_string(&app.join("config/application.config.php"))?;
//! io::remove_dir_tolerant(&workspace);
//! ```
//!
use crate::core::error::{Result, ZfpackError};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn}; // Logging utilities

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, the directory is created including any missing
/// parents. If the path exists but is not a directory, a
/// `ZfpackError::FileSystem` is returned.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(ZfpackError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes string content to a file path, overwriting it if it exists.
///
/// The parent directory is created first when missing.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    debug!("Wrote content to file: {:?}", path);
    Ok(())
}

/// Recursively deletes `path` and everything under it.
///
/// Each entry is first removed as a file; when that fails the entry is treated
/// as a directory and deleted recursively. Failures are logged and skipped so a
/// single stubborn entry does not keep the rest of the tree alive.
///
/// Returns `false` when `path` could not be opened as a directory at all.
pub fn remove_dir_tolerant(path: &Path) -> bool {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot open {:?} for deletion: {}", path, e);
            return false;
        }
    };

    for entry in entries.flatten() {
        let entry_path = entry.path();
        if fs::remove_file(&entry_path).is_err() && !remove_dir_tolerant(&entry_path) {
            warn!("Could not remove {:?}", entry_path);
        }
    }

    if let Err(e) = fs::remove_dir(path) {
        warn!("Could not remove directory {:?}: {}", path, e);
    }
    true
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_new() -> Result<()> {
        let base_dir = tempdir()?;
        let new_dir = base_dir.path().join("new/subdir");
        assert!(!new_dir.exists());
        ensure_dir_exists(&new_dir)?;
        assert!(new_dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_dir_exists_path_is_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("a_file.txt");
        fs::write(&file_path, "hello")?;
        let result = ensure_dir_exists(&file_path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Path exists but is not a directory"));
        Ok(())
    }

    #[test]
    fn test_read_write_string_to_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("nested/test_rw.txt");
        write_string_to_file(&file_path, "return array();")?;
        assert_eq!(read_file_to_string(&file_path)?, "return array();");
        Ok(())
    }

    #[test]
    fn test_read_file_not_found() -> Result<()> {
        let base_dir = tempdir()?;
        let result = read_file_to_string(&base_dir.path().join("nonexistent.txt"));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_remove_dir_tolerant_deletes_tree() -> Result<()> {
        let base_dir = tempdir()?;
        let root = base_dir.path().join("ZFDeploy_abc");
        fs::create_dir_all(root.join("data/module/Application/src"))?;
        fs::write(root.join("deployment.xml"), "<package/>")?;
        fs::write(root.join("data/module/Application/src/Module.php"), "<?php")?;

        assert!(remove_dir_tolerant(&root));
        assert!(!root.exists());
        Ok(())
    }

    #[test]
    fn test_remove_dir_tolerant_missing_dir() {
        let base_dir = tempdir().unwrap();
        assert!(!remove_dir_tolerant(&base_dir.path().join("gone")));
    }
}
