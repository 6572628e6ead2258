//! # zfpack Build Command
//!
//! File: cli/src/commands/build/mod.rs
//!
//! ## Overview
//!
//! The `build` command packages a Zend Framework application into a `.zip`,
//! `.tar`, `.tar.gz`, `.tgz` or `.zpk` file. The output suffix selects the
//! format.
//!
//! ## Architecture
//!
//! - `request.rs`: Validates the options into an immutable `BuildRequest`
//! - `application.rs`: Reads and rewrites `config/application.config.php`
//! - `manifest.rs`: Validates Zend Server `deployment.xml` files
//! - `zpk.rs`: Stages the zpk layout (`data/`, `scripts/`, logo, manifest)
//! - `modules.rs`: Restricts the package to the requested modules
//! - `installer.rs`: Runs Composer in the staged tree
//! - `pipeline.rs`: Sequences the stages and always removes the workspace
//!
//! ## Examples
//!
//! ```bash
//! # Package the application in the current directory
//! zfpack build shop.zip
//!
//! # Package two modules of another application as a Zend Server package
//! zfpack build shop.zpk --target ../shop --modules Application,Catalog --version 1.2.0
//!
//! # Ship the local vendor directory and skip .gitignore filtering
//! zfpack build shop.tgz --vendor --gitignore off
//! ```
//!
//! Build flow:
//! 1. Validate the request (nothing is written if this fails)
//! 2. Load the tool configuration
//! 3. Run the packaging pipeline and print the result
//!
use crate::common::ui::ConsoleSink; // Progress lines on stdout
use crate::core::config;
use crate::core::error::Result;
use clap::{Parser, ValueEnum}; // Argument parsing
use std::path::PathBuf;
use tracing::info;

pub mod application;
pub mod installer;
pub mod manifest;
pub mod modules;
pub mod pipeline;
pub mod request;
pub mod zpk;

use request::{BuildRequest, RequestOptions};

/// An `on`/`off` option value.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        self == Switch::On
    }
}

/// Arguments for the `build` command.
#[derive(Parser, Debug)]
#[command(about = "Package a Zend Framework application (zip, tar, tar.gz, tgz or zpk)")]
pub struct BuildArgs {
    /// Package file to create; its suffix selects the format.
    #[arg(value_name = "PACKAGE")]
    package: PathBuf,

    /// Path to the application to package (defaults to the current directory).
    #[arg(long, short)]
    target: Option<PathBuf>,

    /// Comma-separated list of modules to include (all by default).
    #[arg(long, short, value_delimiter = ',')]
    modules: Vec<String>,

    /// Ship the application's own vendor directory instead of running Composer.
    #[arg(long, short = 'e')]
    vendor: bool,

    /// Run Composer in the staged application.
    #[arg(long, short, value_enum, default_value = "on")]
    composer: Switch,

    /// Honour .gitignore files while copying.
    #[arg(long, short, value_enum, default_value = "on")]
    gitignore: Switch,

    /// Directory of extra *.php files merged into config/autoload.
    #[arg(long)]
    configs: Option<PathBuf>,

    /// Custom deployment.xml for zpk packages.
    #[arg(long, short)]
    deploymentxml: Option<PathBuf>,

    /// Directory with zpk assets (deployment.xml, logo, scripts).
    #[arg(long, short)]
    zpkdata: Option<PathBuf>,

    /// Application version (defaults to the current date and time).
    #[arg(long = "version", value_name = "VERSION")]
    app_version: Option<String>,
}

impl BuildArgs {
    fn into_options(self) -> Result<RequestOptions> {
        let target = match self.target {
            Some(target) => target,
            None => std::env::current_dir()?,
        };
        Ok(RequestOptions {
            package: self.package,
            target,
            modules: self.modules,
            include_vendor: self.vendor,
            use_installer: self.composer.enabled(),
            use_gitignore: self.gitignore.enabled(),
            configs: self.configs,
            deployment_xml: self.deploymentxml,
            zpk_data: self.zpkdata,
            app_version: self.app_version,
        })
    }
}

/// # Handle Build Command (`handle_build`)
///
/// Validates `args`, loads the configuration (from `config_path` when given)
/// and runs the packaging pipeline, printing progress to stdout.
///
/// # Arguments
///
/// * `args` - Parsed `build` arguments.
/// * `config_path` - The global `--config` file, if any.
///
/// # Errors
///
/// Returns an `Err` if the request is invalid, the configuration cannot be
/// loaded, or any pipeline stage fails.
pub async fn handle_build(args: BuildArgs, config_path: Option<PathBuf>) -> Result<()> {
    info!("Handling build command with args: {:?}", args);

    // Nothing touches the disk until the request is valid.
    let request = BuildRequest::validate(args.into_options()?)?;
    let config = config::load_config(config_path.as_deref(), &request.source)?;

    let mut sink = ConsoleSink;
    let report = pipeline::run(&request, &config, &mut sink).await?;
    info!("Built {} ({} bytes)", report.path.display(), report.size);
    Ok(())
}
