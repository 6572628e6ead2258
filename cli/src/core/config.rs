//! # zfpack Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for zfpack, handling loading,
//! merging, validation, and access to configuration data. It supports a multi-level
//! configuration approach that combines defaults, user settings, and overrides
//! shipped with the application being packaged.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file (`--config <file>` or `ZFPACK_CONFIG`), which replaces 2 and 3
//! 2. Project-specific `.zfpack.toml` at the root of the application being packaged
//! 3. User-specific `~/.config/zfpack/config.toml`
//! 4. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! [installer]
//! command = "composer"
//! php = "php"
//! phar_url = "https://getcomposer.org/composer.phar"
//! strip_tests = true
//!
//! [workspace]
//! temp_root = "~/tmp"
//! prefix = "ZFDeploy_"
//! ```
//!
//! The configuration is loaded once per build and passed down to the stages
//! that need it.
//!
use crate::core::error::{Result, ZfpackError}; // Standard Result and error types
use anyhow::{anyhow, Context}; // Error creation and context
use directories::ProjectDirs; // Platform config directory
use serde::Deserialize; // TOML deserialization
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn}; // Logging utilities

/// File name of the per-application configuration override.
pub const PROJECT_CONFIG_FILENAME: &str = ".zfpack.toml";

/// The effective configuration after defaults, user and project files are merged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    pub installer: InstallerConfig,
    pub workspace: WorkspaceConfig,
}

/// Settings for locating and running the dependency installer.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallerConfig {
    /// Installer command looked up on PATH.
    pub command: String,
    /// Interpreter used to run a `composer.phar` found in or downloaded to the workspace.
    pub php: String,
    /// Download location of the self-contained installer.
    pub phar_url: String,
    /// Remove `vendor/*/*/test(s)` directories after a successful install.
    pub strip_tests: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            command: default_installer_command(),
            php: default_php_binary(),
            phar_url: default_phar_url(),
            strip_tests: default_strip_tests(),
        }
    }
}

/// Settings for the temporary staging workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    /// Directory under which workspaces are created (can use ~). Defaults to the system temp dir.
    pub temp_root: Option<String>,
    /// Name prefix of each workspace directory.
    pub prefix: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            prefix: default_workspace_prefix(),
        }
    }
}

impl WorkspaceConfig {
    /// Resolved root directory for new workspaces.
    pub fn root(&self) -> PathBuf {
        match &self.temp_root {
            Some(root) => PathBuf::from(root),
            None => std::env::temp_dir(),
        }
    }
}

/// One configuration file as written on disk. A missing key stays `None`, so a
/// lower layer can be told apart from an explicit value equal to the default.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
struct ConfigFile {
    #[serde(default)]
    installer: InstallerFile,
    #[serde(default)]
    workspace: WorkspaceFile,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct InstallerFile {
    command: Option<String>,
    php: Option<String>,
    phar_url: Option<String>,
    strip_tests: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct WorkspaceFile {
    temp_root: Option<String>,
    prefix: Option<String>,
}

impl ConfigFile {
    /// Layers `self` over `lower`: every key set in `self` wins.
    fn over(self, lower: ConfigFile) -> ConfigFile {
        ConfigFile {
            installer: InstallerFile {
                command: self.installer.command.or(lower.installer.command),
                php: self.installer.php.or(lower.installer.php),
                phar_url: self.installer.phar_url.or(lower.installer.phar_url),
                strip_tests: self.installer.strip_tests.or(lower.installer.strip_tests),
            },
            workspace: WorkspaceFile {
                temp_root: self.workspace.temp_root.or(lower.workspace.temp_root),
                prefix: self.workspace.prefix.or(lower.workspace.prefix),
            },
        }
    }

    /// Fills every key still unset with its default.
    fn resolve(self) -> Config {
        Config {
            installer: InstallerConfig {
                command: self.installer.command.unwrap_or_else(default_installer_command),
                php: self.installer.php.unwrap_or_else(default_php_binary),
                phar_url: self.installer.phar_url.unwrap_or_else(default_phar_url),
                strip_tests: self.installer.strip_tests.unwrap_or_else(default_strip_tests),
            },
            workspace: WorkspaceConfig {
                temp_root: self.workspace.temp_root,
                prefix: self.workspace.prefix.unwrap_or_else(default_workspace_prefix),
            },
        }
    }
}

fn default_installer_command() -> String {
    "composer".to_string()
}
fn default_php_binary() -> String {
    "php".to_string()
}
fn default_phar_url() -> String {
    "https://getcomposer.org/composer.phar".to_string()
}
fn default_strip_tests() -> bool {
    true
}
fn default_workspace_prefix() -> String {
    "ZFDeploy_".to_string()
}

/// # Load Configuration (`load_config`)
///
/// Loads the effective configuration for packaging the application at `app_path`.
///
/// # Arguments
///
/// * `explicit` - A configuration file given on the command line or via `ZFPACK_CONFIG`.
///   When set, only that file is read on top of the defaults.
/// * `app_path` - Root of the application, searched for `.zfpack.toml`.
///
/// # Returns
///
/// * `Result<Config>` - The merged, expanded and validated configuration.
///
/// # Errors
///
/// Returns an `Err` if:
/// * A configuration file cannot be read or is not valid TOML.
/// * A file contains an unknown key.
/// * A merged value fails validation (empty command, non-http URL, missing temp root).
pub fn load_config(explicit: Option<&Path>, app_path: &Path) -> Result<Config> {
    // Step 1: Collect the file layers, highest precedence last
    let layers = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            vec![load_config_from_path(path)?]
        }
        None => {
            let user_config = load_user_config()?;
            let project_config = load_project_config(app_path)?;
            user_config.into_iter().chain(project_config).collect()
        }
    };

    // Step 2: Merge them and fill in the defaults
    let mut merged = merge_configs(layers);

    // Step 3: Expand and validate the result
    expand_config_paths(&mut merged).context("Failed to expand paths in configuration")?;
    validate_config(&merged).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged);
    Ok(merged)
}

fn load_user_config() -> Result<Option<ConfigFile>> {
    if let Some(proj_dirs) = ProjectDirs::from("org", "zfpack", "zfpack") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(app_path: &Path) -> Result<Option<ConfigFile>> {
    let project_config_path = app_path.join(PROJECT_CONFIG_FILENAME);
    if project_config_path.is_file() {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!(
            "No project configuration file ({}) found in {}.",
            PROJECT_CONFIG_FILENAME,
            app_path.display()
        );
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Merges `layers` (lowest precedence first) and applies the defaults.
fn merge_configs(layers: Vec<ConfigFile>) -> Config {
    layers
        .into_iter()
        .fold(ConfigFile::default(), |lower, upper| upper.over(lower))
        .resolve()
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(root) = &config.workspace.temp_root {
        let expanded = shellexpand::tilde(root).into_owned();
        debug!("Expanded workspace root: {}", expanded);
        config.workspace.temp_root = Some(expanded);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if config.installer.command.trim().is_empty() {
        return Err(anyhow!(ZfpackError::Config(
            "installer.command must not be empty".to_string()
        )));
    }
    if config.installer.php.trim().is_empty() {
        return Err(anyhow!(ZfpackError::Config(
            "installer.php must not be empty".to_string()
        )));
    }
    let url = &config.installer.phar_url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(anyhow!(ZfpackError::Config(format!(
            "installer.phar_url '{}' must be an http or https URL",
            url
        ))));
    }
    if config.workspace.prefix.trim().is_empty() {
        return Err(anyhow!(ZfpackError::Config(
            "workspace.prefix must not be empty".to_string()
        )));
    }
    if let Some(root) = &config.workspace.temp_root {
        if !Path::new(root).is_dir() {
            return Err(anyhow!(ZfpackError::Config(format!(
                "workspace.temp_root '{}' is not an existing directory",
                root
            ))));
        }
    }
    debug!("Configuration validation successful.");
    Ok(())
}
