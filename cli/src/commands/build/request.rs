//! # Build Request Validation (`build::request`)
//!
//! File: cli/src/commands/build/request.rs
//!
//! ## Overview
//!
//! Turns the raw `build` options into an immutable, validated `BuildRequest`.
//! Every check runs before anything is written to disk, so a rejected request
//! never leaves a workspace or partial package behind.
//!
//! ## Checks (in order)
//!
//! 1. A package file name was given.
//! 2. The package file does not exist yet.
//! 3. Its suffix names a supported format (`ZfpackError::UnknownFormat` otherwise).
//! 4. For `.tar.gz`/`.tgz`, the intermediate `.tar` (and, for `.tgz`, `.tar.gz`) does not exist.
//! 5. The target is a directory holding a Zend Framework application.
//! 6. Every requested module exists under `module/` (`\` is normalized to `/`).
//! 7. A custom `deployment.xml` exists and is valid.
//! 8. A ZPK data directory exists and holds a valid `deployment.xml`.
//! 9. An extra configuration directory exists.
//!
//! Failures are `ZfpackError::InvalidInput`, except the format and manifest
//! checks which carry their own error kinds.
//!
use super::application::ApplicationDescriptor; // Parsed application.config.php
use super::manifest::{self, DEPLOYMENT_XML}; // deployment.xml validation
use crate::common::archive::ArchiveFormat; // Output format from the suffix
use crate::core::error::{Result, ZfpackError}; // Standard Result and custom Error
use anyhow::Context; // For error context wrapping
use chrono::Local; // Default application version
use std::path::{Component, Path, PathBuf};
use tracing::debug; // Logging utilities

/// Options as received from the command line.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub package: PathBuf,
    pub target: PathBuf,
    pub modules: Vec<String>,
    pub include_vendor: bool,
    pub use_installer: bool,
    pub use_gitignore: bool,
    pub configs: Option<PathBuf>,
    pub deployment_xml: Option<PathBuf>,
    pub zpk_data: Option<PathBuf>,
    pub app_version: Option<String>,
}

/// A validated packaging request.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Canonical path of the application being packaged.
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: ArchiveFormat,
    /// Requested modules; empty means all of them.
    pub modules: Vec<String>,
    pub include_vendor: bool,
    pub use_installer: bool,
    pub use_gitignore: bool,
    pub extra_config_dir: Option<PathBuf>,
    pub deployment_xml: Option<PathBuf>,
    pub zpk_assets_dir: Option<PathBuf>,
    pub app_version: String,
    pub application: ApplicationDescriptor,
}

fn invalid(message: String) -> anyhow::Error {
    ZfpackError::InvalidInput(message).into()
}

/// Module name with namespace separators turned into path separators.
pub fn module_dir(module: &str) -> String {
    module.replace('\\', "/")
}

/// Default application version: the current local time.
pub fn default_app_version() -> String {
    Local::now().format("%Y-%m-%d_%H:%M").to_string()
}

impl BuildRequest {
    /// # Validate Build Request (`validate`)
    ///
    /// Checks every precondition of a build and turns the raw `options` into
    /// an immutable `BuildRequest`. Nothing is created or modified on disk, so
    /// a rejected request leaves no trace.
    ///
    /// # Arguments
    ///
    /// * `options` - The options collected from the command line.
    ///
    /// # Returns
    ///
    /// * `Result<BuildRequest>` - The validated request with the canonical
    ///   source path, the detected format, trimmed module names and the
    ///   application version (defaulting to the current local time).
    ///
    /// # Errors
    ///
    /// Returns an `Err` at the first failing check, in this order:
    /// - `InvalidInput` for a missing or existing package file.
    /// - `UnknownFormat` for an unsupported suffix.
    /// - `InvalidInput` for a leftover intermediate archive, an invalid
    ///   application path, a missing or malformed module name, a missing
    ///   deployment XML, ZPK data directory or configs directory.
    /// - `SchemaValidation` for a deployment XML that does not validate.
    pub fn validate(options: RequestOptions) -> Result<Self> {
        // --- Output package ---
        let output = options.package;
        if output.as_os_str().is_empty() {
            return Err(invalid("missing package filename".to_string()));
        }
        if output.exists() {
            return Err(invalid(format!(
                "package file \"{}\" already exists",
                output.display()
            )));
        }
        let format = ArchiveFormat::from_path(&output)?;
        check_intermediates(&output, format)?;

        // --- Application ---
        if !options.target.is_dir() {
            return Err(invalid(format!(
                "the application path \"{}\" is not valid",
                options.target.display()
            )));
        }
        // Canonical form keeps exclusion paths and .gitignore matches comparable.
        let source = options
            .target
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", options.target.display()))?;
        let application = ApplicationDescriptor::load(&source)?;

        // --- Modules ---
        let modules: Vec<String> = options
            .modules
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        for module in &modules {
            check_module(&source, module, &options.target)?;
        }

        // --- ZPK inputs ---
        if let Some(xml) = &options.deployment_xml {
            if !xml.is_file() {
                return Err(invalid(format!(
                    "The deployment XML file \"{}\" does not exist",
                    xml.display()
                )));
            }
            manifest::validate_file(xml)?;
        }

        if let Some(dir) = &options.zpk_data {
            check_zpk_data(dir)?;
        }

        // --- Extra configuration ---
        if let Some(dir) = &options.configs {
            if !dir.is_dir() {
                return Err(invalid(format!(
                    "The configs directory \"{}\" does not exist",
                    dir.display()
                )));
            }
        }

        let request = Self {
            source,
            output,
            format,
            modules,
            include_vendor: options.include_vendor,
            use_installer: options.use_installer,
            use_gitignore: options.use_gitignore,
            extra_config_dir: options.configs,
            deployment_xml: options.deployment_xml,
            zpk_assets_dir: options.zpk_data,
            app_version: options.app_version.unwrap_or_else(default_app_version),
            application,
        };
        debug!("Validated build request: {:?}", request);
        Ok(request)
    }

    /// Package name used for `{NAME}`: the output file name without its suffix.
    pub fn package_name(&self) -> String {
        self.format.base_name(&self.output)
    }
}

/// A module must name a directory below `module/` using plain path segments.
fn check_module(source: &Path, module: &str, target: &Path) -> Result<()> {
    let dir = module_dir(module);
    let relative = Path::new(&dir);
    // `..`, `.`, roots and prefixes would escape or alias `module/`.
    let plain = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !plain {
        return Err(invalid(format!("the module name \"{}\" is not valid", module)));
    }
    if !source.join("module").join(relative).is_dir() {
        return Err(invalid(format!(
            "the module \"{}\" does not exist in {}",
            module,
            target.display()
        )));
    }
    Ok(())
}

/// Refuses to overwrite the `.tar` (and for `.tgz` the `.tar.gz`) built on the way.
fn check_intermediates(output: &Path, format: ArchiveFormat) -> Result<()> {
    if !format.is_gzipped() {
        return Ok(());
    }
    let tar = format.container_path(output);
    let mut intermediates = vec![tar.clone()];
    if format == ArchiveFormat::Tgz {
        // gzip_file writes `<base>.tar.gz` before it is renamed to `.tgz`.
        intermediates.push(tar.with_file_name(format!("{}.tar.gz", format.base_name(output))));
    }
    match intermediates.iter().find(|path| path.exists()) {
        Some(path) => Err(invalid(format!(
            "intermediate file \"{}\" already exists",
            path.display()
        ))),
        None => Ok(()),
    }
}

fn check_zpk_data(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(invalid(format!(
            "The specified ZPK data directory \"{}\" does not exist",
            dir.display()
        )));
    }
    let xml = dir.join(DEPLOYMENT_XML);
    if !xml.is_file() {
        return Err(invalid(format!(
            "The specified ZPK data directory \"{}\" does not contain a deployment.xml file",
            dir.display()
        )));
    }
    manifest::validate_file(&xml)?;
    Ok(())
}
