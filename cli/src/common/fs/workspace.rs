//! # zfpack Staging Workspace
//!
//! File: cli/src/common/fs/workspace.rs
//!
//! ## Overview
//!
//! A `Workspace` is the private temporary directory in which one build
//! assembles its package tree. It is created fresh per build under the
//! configured root and removed when the build ends, whatever the outcome.
//!
//! ## Naming
//!
//! Directory names are the configured prefix followed by a hex timestamp with
//! microsecond resolution. Creation uses `create_dir`, so an existing path is
//! detected atomically; on collision a new name is generated, up to
//! `MAX_ATTEMPTS` times before giving up with `ZfpackError::TempDirExhausted`.
//!
use crate::common::fs::io;
use crate::core::error::{Result, ZfpackError};
use anyhow::Context;
use chrono::Utc; // Timestamp part of the workspace name
use std::fs;
use std::io::ErrorKind; // AlreadyExists means the name is taken
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Number of names tried before workspace creation fails.
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Creates a new, uniquely named workspace directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns `ZfpackError::TempDirExhausted` when every attempted name is
    /// taken, or an `Err` if `root` cannot be created or written.
    pub fn create(root: &Path, prefix: &str) -> Result<Self> {
        Self::create_with(root, || unique_name(prefix))
    }

    fn create_with(root: &Path, mut next_name: impl FnMut() -> String) -> Result<Self> {
        for attempt in 1..=MAX_ATTEMPTS {
            let path = root.join(next_name());
            match fs::create_dir(&path) {
                Ok(()) => {
                    info!("Created workspace {:?}", path);
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Workspace name collision on attempt {}: {:?}", attempt, path);
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create workspace {:?}", path));
                }
            }
        }
        anyhow::bail!(ZfpackError::TempDirExhausted {
            root: root.to_path_buf(),
            attempts: MAX_ATTEMPTS,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the workspace and everything in it, tolerating entries that
    /// cannot be removed.
    pub fn destroy(self) {
        if io::remove_dir_tolerant(&self.path) {
            info!("Removed workspace {:?}", self.path);
        }
    }
}

fn unique_name(prefix: &str) -> String {
    let now = Utc::now();
    format!(
        "{}{:08x}{:05x}",
        prefix,
        now.timestamp(),
        now.timestamp_subsec_micros()
    )
}
