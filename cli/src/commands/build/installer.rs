//! # Dependency Installer (`build::installer`)
//!
//! File: cli/src/commands/build/installer.rs
//!
//! ## Overview
//!
//! Runs Composer inside the workspace so the package ships with a production
//! `vendor/` directory instead of the developer's local one.
//!
//! ## Installer Resolution
//!
//! 1. `installer.command` (default `composer`) found on `PATH`.
//! 2. A `composer.phar` already in the workspace, run with `installer.php` after
//!    a `self-update`.
//! 3. Otherwise `composer.phar` is downloaded from `installer.phar_url` into the
//!    workspace. A downloaded phar is deleted after the install, whether it
//!    succeeded or not, so it never ends up in the package.
//!
//! The install command is `install --no-dev --prefer-dist --optimize-autoloader`,
//! run with the workspace as the child's working directory. Only the exit code
//! decides success; a failure carries the captured output in
//! `ZfpackError::InstallFailed`.
//!
//! After a successful install, `vendor/*/*/test` and `vendor/*/*/tests`
//! directories are removed when `installer.strip_tests` is enabled.
//!
use crate::common::{network, process, system, ui::MessageSink}; // Download, subprocess and PATH helpers
use crate::core::config::InstallerConfig;
use crate::core::error::{Result, ZfpackError}; // Standard Result and error types
use anyhow::Context; // For error context wrapping
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn}; // Logging utilities
use walkdir::WalkDir; // Depth-limited vendor scan

pub const PHAR_NAME: &str = "composer.phar";
pub const INSTALL_ARGS: [&str; 4] = [
    "install",
    "--no-dev",
    "--prefer-dist",
    "--optimize-autoloader",
];

/// How the installer will be invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installer {
    /// An executable found on `PATH` (or given as a path).
    Command(PathBuf),
    /// A phar in the workspace, run through the PHP interpreter.
    Phar { path: PathBuf, downloaded: bool },
}

impl Installer {
    /// Program and arguments for running the installer with `args`.
    fn invocation(&self, php: &str, args: &[&str]) -> (String, Vec<String>) {
        let args = args.iter().map(|a| a.to_string());
        match self {
            Installer::Command(path) => (path.to_string_lossy().into_owned(), args.collect()),
            Installer::Phar { .. } => (
                php.to_string(),
                std::iter::once(PHAR_NAME.to_string()).chain(args).collect(),
            ),
        }
    }
}

/// # Resolve Installer (`resolve`)
///
/// Picks the installer to use for `workspace`, downloading one if needed.
///
/// # Arguments
///
/// * `workspace` - The staged application root.
/// * `config` - Command name, PHP interpreter and phar download URL.
///
/// # Returns
///
/// * `Result<Installer>` - The command on `PATH`, or a phar inside `workspace`.
///
/// # Errors
///
/// Returns an `Err` only when the phar has to be downloaded and the download fails.
/// A failing `self-update` of a cached phar is logged and ignored.
pub async fn resolve(workspace: &Path, config: &InstallerConfig) -> Result<Installer> {
    if let Some(path) = system::find_executable(&config.command) {
        return Ok(Installer::Command(path));
    }

    // A phar shipped with the application is refreshed, not replaced.
    let phar = workspace.join(PHAR_NAME);
    if phar.is_file() {
        info!("Using cached {}", phar.display());
        let installer = Installer::Phar {
            path: phar,
            downloaded: false,
        };
        let (program, args) = installer.invocation(&config.php, &["self-update"]);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        match process::run_capture(&program, &arg_refs, Some(workspace)).await {
            Ok(output) if output.success() => {}
            Ok(output) => warn!(
                "Composer self-update exited with {}: {}",
                output.status_text(),
                output.combined()
            ),
            Err(e) => warn!("Composer self-update could not run: {:#}", e),
        }
        return Ok(installer);
    }

    network::download_file(&config.phar_url, &phar).await?;
    Ok(Installer::Phar {
        path: phar,
        downloaded: true,
    })
}

/// # Install Dependencies (`install`)
///
/// Installs the application's dependencies inside `workspace`.
///
/// # Arguments
///
/// * `workspace` - The staged application root, used as the child's working directory.
/// * `config` - Installer settings, including whether to strip vendor tests.
/// * `sink` - Receives the `Executing ...` line.
///
/// # Returns
///
/// * `Result<()>` - `Ok(())` when the installer exited successfully.
///
/// # Errors
///
/// Returns an `Err` if:
/// * No installer can be resolved.
/// * The installer cannot be started.
/// * It exits unsuccessfully (`ZfpackError::InstallFailed` with its output).
/// * A vendor test directory cannot be removed.
pub async fn install(
    workspace: &Path,
    config: &InstallerConfig,
    sink: &mut dyn MessageSink,
) -> Result<()> {
    let installer = resolve(workspace, config).await?;
    let (program, args) = installer.invocation(&config.php, &INSTALL_ARGS);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let command_line = process::display_command(&program, &arg_refs);
    sink.line(&format!("Executing {}", command_line));

    let result = process::run_capture(&program, &arg_refs, Some(workspace)).await;

    // A downloaded phar must not end up in the package, even after a failed install.
    if let Installer::Phar {
        path,
        downloaded: true,
    } = &installer
    {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove downloaded {}: {}", path.display(), e);
        }
    }

    let output = result?;
    if !output.success() {
        anyhow::bail!(ZfpackError::InstallFailed {
            cmd: command_line,
            status: output.status_text(),
            output: output.combined(),
        });
    }
    info!("Dependencies installed in {}", workspace.display());

    if config.strip_tests {
        let removed = strip_vendor_tests(workspace)?;
        info!("Removed {} vendor test directories", removed);
    }
    Ok(())
}

/// Deletes `vendor/*/*/test` and `vendor/*/*/tests`; returns how many were removed.
pub fn strip_vendor_tests(workspace: &Path) -> Result<usize> {
    let vendor = workspace.join("vendor");
    if !vendor.is_dir() {
        return Ok(0);
    }

    // Depth 3 below vendor is `<vendor>/<package>/<dir>`.
    let targets: Vec<PathBuf> = WalkDir::new(&vendor)
        .min_depth(3)
        .max_depth(3)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| matches!(entry.file_name().to_str(), Some("test") | Some("tests")))
        .map(|entry| entry.into_path())
        .collect();

    for dir in &targets {
        fs::remove_dir_all(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
    }
    Ok(targets.len())
}
