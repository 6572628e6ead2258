//! # zfpack Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! This module groups the filesystem helpers used while staging a package:
//! filtered tree copies, `.gitignore` exclusion computation, the temporary
//! staging workspace, and small I/O wrappers.
//!
//! ## Architecture
//!
//! - **`copy`**: `copy_tree` (filtered, permission-preserving mirror) and `copy_directory_contents` (plain `fs_extra` copy).
//! - **`exclude`**: `ExclusionSet` and `compute_exclusions`, the per-directory `.gitignore` filter.
//! - **`io`**: `ensure_dir_exists`, `read_file_to_string`, `write_string_to_file`, `remove_dir_tolerant`.
//! - **`workspace`**: `Workspace`, the uniquely named staging directory of one build.
//!
//! Callers import from the specific submodule.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::{copy, exclude::ExclusionSet, workspace::Workspace};
//!
//! let workspace = Workspace::create(&config.workspace.root(), &config.workspace.prefix)?;
//! copy::copy_tree(&app, workspace.path(), &ExclusionSet::new(), true)?;
//! workspace.destroy();
//! ```
//!

/// Filtered tree copy and plain directory-content copy.
pub mod copy;
/// `.gitignore`-driven exclusion sets.
pub mod exclude;
/// Basic file I/O operations.
pub mod io;
/// Temporary staging directory lifecycle.
pub mod workspace;
