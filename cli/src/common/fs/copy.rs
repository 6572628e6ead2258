//! # zfpack Filesystem Copy Operations
//!
//! File: cli/src/common/fs/copy.rs
//!
//! ## Overview
//!
//! This module provides the two copy primitives used while staging a package:
//!
//! - `copy_tree`: the filtered mirror of an application tree. Exclusions are
//!   re-derived for every directory (see `exclude::compute_exclusions`), the
//!   `.git` directory is always skipped, and permissions are carried over.
//! - `copy_directory_contents`: an unfiltered copy of a directory's contents
//!   into an existing target, delegated to `fs_extra`. It is used for the zpk
//!   asset directory, which is copied as-is.
//!
//! ## Architecture
//!
//! `copy_tree` walks the source with an explicit worklist of
//! `(source_dir, dest_dir, exclusions)` items rather than recursion, so deeply
//! nested trees cannot exhaust the stack. Each item's exclusion set is the
//! parent's set plus whatever the item's own `.gitignore` adds.
//!
//! A directory that cannot be read is logged and skipped; the copy carries on
//! with the remaining work items.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::copy;
//! use crate::common::fs::exclude::ExclusionSet;
//!
//! let excluded: ExclusionSet = [app.join("vendor")].into_iter().collect();
//! copy::copy_tree(&app, &staging, &excluded, true)?;
//! ```
//!
use crate::common::fs::exclude::{compute_exclusions, ExclusionSet}; // Per-directory skip lists
use crate::core::error::Result; // Standard Result
use anyhow::Context; // For error context wrapping
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn}; // Logging utilities

/// Directory name skipped unconditionally by `copy_tree`.
const GIT_DIR: &str = ".git";

/// Mode given to destination directories whose source is not writable.
#[cfg(unix)]
const FALLBACK_DIR_MODE: u32 = 0o775;

/// One pending directory of the copy.
struct CopyItem {
    source: PathBuf,
    dest: PathBuf,
    exclusions: ExclusionSet,
}

/// # Copy Tree (`copy_tree`)
///
/// Copies `source` into `dest`, skipping excluded paths and `.git`.
///
/// # Arguments
///
/// * `source` - The directory to mirror.
/// * `dest` - The destination, created when missing.
/// * `exclusions` - Absolute paths under `source` that are never copied.
/// * `use_gitignore` - When set, every copied directory's `.gitignore` adds
///   exclusions for its own subtree.
///
/// # Returns
///
/// * `Result<()>` - `Ok(())` once every readable directory has been copied.
///
/// # Errors
///
/// Returns an `Err` if a destination directory cannot be created, its
/// permissions cannot be set, or a file cannot be copied. Unreadable source
/// directories are only logged.
pub fn copy_tree(
    source: &Path,
    dest: &Path,
    exclusions: &ExclusionSet,
    use_gitignore: bool,
) -> Result<()> {
    info!("Copying {:?} to {:?}", source, dest);
    fs::create_dir_all(dest).with_context(|| format!("Failed to create directory {:?}", dest))?;

    let mut worklist = vec![CopyItem {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
        exclusions: exclusions.clone(),
    }];
    let mut files_copied = 0usize;

    // Each popped item carries the exclusions inherited from its parent.
    while let Some(item) = worklist.pop() {
        let excluded = compute_exclusions(&item.source, &item.exclusions, use_gitignore);

        let entries = match fs::read_dir(&item.source) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read directory {:?}, skipping: {}", item.source, e);
                continue;
            }
        };

        for entry in entries.flatten() {
            if entry.file_name() == GIT_DIR {
                continue;
            }
            let entry_source = entry.path();
            if excluded.contains(&entry_source) {
                debug!("Excluded {:?}", entry_source);
                continue;
            }
            let entry_dest = item.dest.join(entry.file_name());
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("Cannot stat {:?}, skipping: {}", entry_source, e);
                    continue;
                }
            };

            // Symlinks are followed, matching what a plain read of the tree sees.
            let is_dir = if file_type.is_symlink() {
                entry_source.is_dir()
            } else {
                file_type.is_dir()
            };

            if is_dir {
                // Create now so the permissions exist before children land; contents come later.
                create_dir_like(&entry_source, &entry_dest)?;
                worklist.push(CopyItem {
                    source: entry_source,
                    dest: entry_dest,
                    exclusions: excluded.clone(),
                });
            } else {
                fs::copy(&entry_source, &entry_dest).with_context(|| {
                    format!("Failed to copy {:?} to {:?}", entry_source, entry_dest)
                })?;
                files_copied += 1;
            }
        }
    }

    info!("Copied {} files from {:?}", files_copied, source);
    Ok(())
}

/// Creates `dest` with the permissions of `source` when the source directory
/// is writable, otherwise with a `rwxrwxr-x` default.
fn create_dir_like(source: &Path, dest: &Path) -> Result<()> {
    if !dest.is_dir() {
        fs::create_dir(dest).with_context(|| format!("Failed to create directory {:?}", dest))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = match fs::metadata(source) {
            Ok(meta) if meta.permissions().mode() & 0o200 != 0 => meta.permissions().mode(),
            _ => FALLBACK_DIR_MODE,
        };
        fs::set_permissions(dest, fs::Permissions::from_mode(mode))
            .with_context(|| format!("Failed to set permissions on {:?}", dest))?;
    }
    #[cfg(not(unix))]
    let _ = source;

    Ok(())
}

/// Copies everything inside `source` into `target`, overwriting existing files.
///
/// # Errors
///
/// Returns an `Err` if `fs_extra` fails to copy any entry.
pub fn copy_directory_contents(source: &Path, target: &Path) -> Result<()> {
    info!("Copying contents of {:?} into {:?}", source, target);

    let mut options = fs_extra::dir::CopyOptions::new();
    options.overwrite = true;
    options.content_only = true;

    fs_extra::dir::copy(source, target, &options).map_err(|e| {
        anyhow::anyhow!(e).context(format!("Failed to copy dir {:?} to {:?}", source, target))
    })?;
    Ok(())
}
