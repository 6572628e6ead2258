//! # zfpack Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! This module is the organizational entry point for the shared utilities used
//! by the packaging command. It keeps generic mechanics (copying trees, writing
//! archives, running processes) apart from the packaging rules that live in
//! `commands::build` and the infrastructure in `core`.
//!
//! ## Architecture
//!
//! - **`archive`**: `ArchiveFormat` plus the zip, tar and gzip writers that produce the final package.
//! - **`fs`**: Filtered tree copy, `.gitignore` exclusions, the staging workspace, basic I/O.
//! - **`network`**: Streaming HTTP download of the installer phar.
//! - **`process`**: External command execution with captured exit code and output.
//! - **`system`**: Executable lookup on `PATH`.
//! - **`ui`**: The `MessageSink` used for user-facing progress lines.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{archive, fs, process};
//!
//! let workspace = fs::workspace::Workspace::create(&root, "ZFDeploy_")?;
//! let output = process::run_capture("composer", &["install"], Some(workspace.path())).await?;
//! archive::archive(workspace.path(), &package, archive::ArchiveFormat::Zip)?;
//! ```
//!

/// Package formats and container writers.
pub mod archive;
/// Filesystem operations (filtered copy, exclusions, workspace, I/O).
pub mod fs;
/// HTTP file download.
pub mod network;
/// External process execution.
pub mod process;
/// Executable lookup.
pub mod system;
/// User-facing message output.
pub mod ui;
