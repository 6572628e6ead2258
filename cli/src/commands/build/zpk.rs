//! # ZPK Staging (`build::zpk`)
//!
//! File: cli/src/commands/build/zpk.rs
//!
//! ## Overview
//!
//! Prepares the Zend Server package layout in the workspace before the
//! application is copied. A `.zpk` is a zip whose top level holds
//! `deployment.xml`, the lifecycle `scripts/`, an optional logo, and the
//! application itself under `data/`.
//!
//! ## Staging Steps
//!
//! 1. With a ZPK data directory (`--zpkdata`), its contents are copied into the workspace as-is.
//! 2. `data/` is created if the copy did not provide it.
//! 3. Without a data directory, the bundled hook scripts are written to `scripts/`
//!    and a logo is added: the Apigility logo when the application enables
//!    `ZF\Apigility`, the Zend Framework 2 logo otherwise.
//! 4. `deployment.xml` comes from `--deploymentxml` if given, else from the data
//!    directory, else from the bundled template with `{NAME}`, `{VERSION}` and
//!    `{LOGO}` filled in. Whatever ends up in the workspace is validated.
//!
//! The bundled template, scripts and logos are compiled into the binary.
//!
//! For every other format staging is a no-op and the workspace root is the
//! copy destination.
//!
use super::manifest::{self, DEPLOYMENT_XML}; // Manifest validation
use super::request::BuildRequest;
use crate::common::archive::ArchiveFormat;
use crate::common::fs::{copy, io}; // Asset copy and file helpers
use crate::core::error::Result;
use crate::core::templating; // {NAME}/{VERSION}/{LOGO} substitution
use anyhow::Context; // For error context wrapping
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info}; // Logging utilities

/// The bundled `deployment.xml` template.
pub const DEFAULT_DEPLOYMENT_XML: &str = include_str!("../../../assets/zpk/deployment.xml");

/// Zend Server lifecycle hook scripts shipped in `scripts/`.
pub const HOOK_SCRIPTS: [(&str, &str); 8] = [
    ("pre_stage.php", include_str!("../../../assets/zpk/scripts/pre_stage.php")),
    ("post_stage.php", include_str!("../../../assets/zpk/scripts/post_stage.php")),
    ("pre_activate.php", include_str!("../../../assets/zpk/scripts/pre_activate.php")),
    ("post_activate.php", include_str!("../../../assets/zpk/scripts/post_activate.php")),
    ("pre_deactivate.php", include_str!("../../../assets/zpk/scripts/pre_deactivate.php")),
    ("post_deactivate.php", include_str!("../../../assets/zpk/scripts/post_deactivate.php")),
    ("pre_unstage.php", include_str!("../../../assets/zpk/scripts/pre_unstage.php")),
    ("post_unstage.php", include_str!("../../../assets/zpk/scripts/post_unstage.php")),
];

const ZF2_LOGO: (&str, &[u8]) = (
    "zf2-logo.png",
    include_bytes!("../../../assets/zpk/logo/zf2-logo.png"),
);
const APIGILITY_LOGO: (&str, &[u8]) = (
    "apigility-logo.png",
    include_bytes!("../../../assets/zpk/logo/apigility-logo.png"),
);

/// Module whose presence switches the package logo.
pub const APIGILITY_MODULE: &str = "ZF\\Apigility";

pub const DATA_DIR: &str = "data";
pub const SCRIPTS_DIR: &str = "scripts";

/// # Stage ZPK Layout (`stage`)
///
/// Prepares the Zend Server package layout in `workspace` for a `.zpk`
/// request. For every other format this is a no-op.
///
/// # Arguments
///
/// * `workspace` - The empty workspace directory of this build.
/// * `request` - The validated build request.
///
/// # Returns
///
/// * `Result<PathBuf>` - The directory the application must be copied into:
///   `<workspace>/data` for zpk, `workspace` itself otherwise.
///
/// # Errors
///
/// Returns an `Err` if the assets cannot be copied, a file cannot be written,
/// or the final `deployment.xml` does not validate (`SchemaValidation`).
pub fn stage(workspace: &Path, request: &BuildRequest) -> Result<PathBuf> {
    if request.format != ArchiveFormat::Zpk {
        return Ok(workspace.to_path_buf());
    }
    info!("Staging ZPK layout in {}", workspace.display());

    // 1. User-supplied assets are taken as they are.
    if let Some(assets) = &request.zpk_assets_dir {
        copy::copy_directory_contents(assets, workspace)?;
    }

    // 2. The application always lands in data/.
    let data = workspace.join(DATA_DIR);
    io::ensure_dir_exists(&data)?;

    // 3. Without assets, ship the bundled scripts and a logo.
    let mut logo = String::new();
    if request.zpk_assets_dir.is_none() {
        write_hook_scripts(&workspace.join(SCRIPTS_DIR))?;
        logo = write_logo(workspace, request.application.contains_module(APIGILITY_MODULE))?;
    }

    // 4. Pick the manifest: explicit file, then assets, then the bundled template.
    let target = workspace.join(DEPLOYMENT_XML);
    if let Some(custom) = &request.deployment_xml {
        fs::copy(custom, &target).with_context(|| {
            format!("Failed to copy {} to {}", custom.display(), target.display())
        })?;
    } else if request.zpk_assets_dir.is_none() {
        let name = request.package_name();
        let context = [
            ("NAME", name.as_str()),
            ("VERSION", request.app_version.as_str()),
            ("LOGO", logo.as_str()),
        ];
        templating::render_to_file(DEFAULT_DEPLOYMENT_XML, &context, &target)?;
    }
    // Whatever ended up in the workspace must be a valid manifest.
    manifest::validate_file(&target)?;

    Ok(data)
}

fn write_hook_scripts(dir: &Path) -> Result<()> {
    io::ensure_dir_exists(dir)?;
    for (name, content) in HOOK_SCRIPTS {
        io::write_string_to_file(&dir.join(name), content)?;
    }
    debug!("Wrote {} hook scripts to {}", HOOK_SCRIPTS.len(), dir.display());
    Ok(())
}

/// Writes the package logo and returns its file name.
fn write_logo(workspace: &Path, apigility: bool) -> Result<String> {
    let (name, bytes) = if apigility { APIGILITY_LOGO } else { ZF2_LOGO };
    let path = workspace.join(name);
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(name.to_string())
}
