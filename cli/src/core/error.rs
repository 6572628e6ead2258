//! # zfpack Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout zfpack. Every stage of
//! the packaging pipeline reports failures through these variants so the user
//! always gets a descriptive message and the process exits with status 1.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `ZfpackError`: A custom error enum using `thiserror` for the specific failure kinds
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The variants map onto the stages of a build:
//! - Input validation (`InvalidInput`, `SchemaValidation`)
//! - Workspace creation (`TempDirExhausted`)
//! - Dependency installation (`InstallFailed`, `Download`)
//! - Archiving (`UnknownFormat`, `FileSystem`)
//! - Tool configuration (`Config`)
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if output.exists() {
//!     anyhow::bail!(ZfpackError::InvalidInput(format!(
//!         "package file \"{}\" already exists",
//!         output.display()
//!     )));
//! }
//!
//! // Pattern matching on error types
//! if let Some(ZfpackError::InstallFailed { output, .. }) = err.downcast_ref::<ZfpackError>() {
//!     eprintln!("{}", output);
//! }
//! ```
//!
use std::path::PathBuf;
use thiserror::Error; // Derive macro for error types

/// Custom error type for the zfpack application.
#[derive(Error, Debug)]
pub enum ZfpackError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("The deployment XML file \"{}\" is not valid: {reason}", path.display())]
    SchemaValidation { path: PathBuf, reason: String },

    #[error("Cannot create a temporary directory in {} after {attempts} attempts", root.display())]
    TempDirExhausted { root: PathBuf, attempts: u32 },

    #[error("Composer error during install command: {cmd}, Status: {status}, Output:\n{output}")]
    InstallFailed {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Unknown package format \"{0}\", valid formats are: zip, tar, tar.gz, tgz, zpk")]
    UnknownFormat(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
