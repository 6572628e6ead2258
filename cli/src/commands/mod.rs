//! # zfpack Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the zfpack CLI and makes
//! them accessible to the main application entry point (`main.rs`).
//!
//! ## Commands
//!
//! - `build`: Package a Zend Framework application as zip, tar, tar.gz, tgz or zpk
//!
//! Each command defines its own arguments structure and a handler function
//! that processes those arguments.
//!

/// The packaging command. Its stages (request validation, zpk staging, module
/// selection, dependency install, archiving) live in submodules.
pub mod build;
