//! # zfpack System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! Host inspection helpers. Currently this is the lookup of external
//! executables on `PATH` (via the `which` crate), used to decide whether a
//! globally installed dependency installer can be used.
//!
use std::path::PathBuf;
use tracing::debug; // Logging utilities

/// Resolves `command` to an executable path.
///
/// Bare names are searched on `PATH`; a name containing a path separator is
/// checked directly. Returns `None` when nothing executable is found.
pub fn find_executable(command: &str) -> Option<PathBuf> {
    match which::which(command) {
        Ok(path) => {
            debug!("Found '{}' at {}", command, path.display());
            Some(path)
        }
        Err(e) => {
            debug!("'{}' not found: {}", command, e);
            None
        }
    }
}
