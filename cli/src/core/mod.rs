//! # zfpack Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components used by the
//! packaging commands: configuration, error management, and templating.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and error handling utilities
//! - `templating`: Placeholder substitution for the deployment manifest template
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{Result, ZfpackError}; // For error handling
//! use crate::core::templating; // For deployment.xml rendering
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;
