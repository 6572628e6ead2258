//! # Packaging Pipeline (`build::pipeline`)
//!
//! File: cli/src/commands/build/pipeline.rs
//!
//! ## Overview
//!
//! Sequences the packaging stages for one validated `BuildRequest`:
//!
//! ```text
//! workspace -> zpk staging -> tree copy -> module selection -> extra configs
//!           -> dependency install -> archive -> workspace removal -> report
//! ```
//!
//! Every stage runs to completion before the next one starts, and the first
//! failure ends the build. Once the workspace exists it is removed on every
//! path out of the pipeline, successful or not.
//!
//! ## Tree Copy Exclusions
//!
//! - the project configuration file `.zfpack.toml`, always;
//! - `vendor/` and `composer.lock`, unless vendor is included;
//! - `module/`, when only some modules are requested (they are copied by the
//!   module stage instead).
//!
//! The dependency installer runs when vendor is not included and the
//! installer is enabled.
//!
use super::modules;
use super::request::BuildRequest; // The validated build inputs
use super::{installer, zpk};
use crate::common::archive; // Final package writer
use crate::common::fs::exclude::ExclusionSet;
use crate::common::fs::workspace::Workspace;
use crate::common::fs::{copy, io};
use crate::common::ui::MessageSink; // User-facing progress lines
use crate::core::config::{Config, PROJECT_CONFIG_FILENAME};
use crate::core::error::Result; // Standard Result
use anyhow::Context; // For error context wrapping
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info}; // Logging utilities

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub path: PathBuf,
    pub size: u64,
}

/// # Run Pipeline (`run`)
///
/// Runs every packaging stage for `request` inside a fresh workspace and
/// reports the package that was written.
///
/// # Arguments
///
/// * `request` - The validated build request. Nothing has been written yet.
/// * `config` - The loaded configuration (workspace root and prefix, installer).
/// * `sink` - Receives the user-facing progress lines.
///
/// # Returns
///
/// * `Result<BuildReport>` - The package path and its size in bytes.
///
/// # Errors
///
/// Returns an `Err` from the first stage that fails. The workspace is removed
/// before the error is returned.
pub async fn run(
    request: &BuildRequest,
    config: &Config,
    sink: &mut dyn MessageSink,
) -> Result<BuildReport> {
    sink.line(&format!(
        "Creating package \"{}\"...",
        request.output.display()
    ));

    let workspace = Workspace::create(&config.workspace.root(), &config.workspace.prefix)?;
    let result = build_in(workspace.path(), request, config, sink).await;
    // Removed on success and failure alike; the error is surfaced afterwards.
    workspace.destroy();
    let report = result?;

    sink.line(&format!(
        "[DONE] Package {} successfully created ({} bytes)",
        report.path.display(),
        report.size
    ));
    Ok(report)
}

async fn build_in(
    workspace: &Path,
    request: &BuildRequest,
    config: &Config,
    sink: &mut dyn MessageSink,
) -> Result<BuildReport> {
    // Step 1: Lay out the staging dir (`data/` plus scripts and manifest for zpk)
    let staging = zpk::stage(workspace, request)?;

    // Step 2: Copy the application, minus the fixed exclusions and .gitignore matches
    copy::copy_tree(
        &request.source,
        &staging,
        &copy_exclusions(request),
        request.use_gitignore,
    )?;

    // Step 3: Keep only the requested modules
    modules::restrict(
        &request.source,
        &staging,
        &request.modules,
        request.use_gitignore,
    )?;

    // Step 4: Overlay extra autoload configs
    if let Some(dir) = &request.extra_config_dir {
        merge_extra_configs(dir, &staging)?;
    }

    // Step 5: Install dependencies into the staged tree
    if !request.include_vendor && request.use_installer {
        installer::install(&staging, &config.installer, sink).await?;
    } else {
        debug!("Skipping dependency installation");
    }

    // Step 6: Write the package
    sink.line("Creating package...");
    archive::archive(&staging, &request.output, request.format)?;

    let size = fs::metadata(&request.output)
        .with_context(|| format!("Failed to stat {}", request.output.display()))?
        .len();
    Ok(BuildReport {
        path: request.output.clone(),
        size,
    })
}

/// Paths under the source never copied by the tree copy.
fn copy_exclusions(request: &BuildRequest) -> ExclusionSet {
    let source = &request.source;
    let mut excluded = ExclusionSet::new();
    excluded.insert(source.join(PROJECT_CONFIG_FILENAME));
    if !request.include_vendor {
        excluded.insert(source.join("vendor"));
        excluded.insert(source.join("composer.lock"));
    }
    if !request.modules.is_empty() {
        // `modules::restrict` copies the selected modules itself.
        excluded.insert(source.join("module"));
    }
    excluded
}

/// Copies every `*.php` file directly inside `dir` into `config/autoload/`.
///
/// Files already there with the same name are overwritten. Subdirectories are ignored.
fn merge_extra_configs(dir: &Path, staging: &Path) -> Result<()> {
    let autoload = staging.join("config").join("autoload");
    io::ensure_dir_exists(&autoload)?;

    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut merged = 0usize;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_php = path.extension().is_some_and(|ext| ext == "php");
        if !is_php || !path.is_file() {
            continue;
        }
        let target = autoload.join(entry.file_name());
        fs::copy(&path, &target)
            .with_context(|| format!("Failed to copy {} to {}", path.display(), target.display()))?;
        merged += 1;
    }
    info!("Merged {} configuration files from {}", merged, dir.display());
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build::request::RequestOptions;
    use crate::common::ui::MemorySink;
    use crate::core::config::WorkspaceConfig;
    use std::io::Read;
    use tempfile::{tempdir, TempDir};

    const CONFIG: &str = "<?php\nreturn array(\n    'modules' => array(\n        'ZfcBase',\n        'Application',\n        'Test',\n    ),\n);\n";

    fn app() -> TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        for (path, content) in [
            ("config/application.config.php", CONFIG),
            ("config/autoload/global.php", "<?php return array();"),
            ("config/autoload/local.php", "<?php return array('db' => 'secret');"),
            ("config/autoload/.gitignore", "local.php\n"),
            ("module/Application/Module.php", "<?php"),
            ("module/Test/Module.php", "<?php"),
            ("public/index.php", "<?php"),
            ("vendor/autoload.php", "<?php"),
            ("composer.json", "{}"),
            ("composer.lock", "{}"),
            (".zfpack.toml", "[workspace]\n"),
        ] {
            let file = root.join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, content).unwrap();
        }
        dir
    }

    fn test_config(temp_root: &Path) -> Config {
        Config {
            workspace: WorkspaceConfig {
                temp_root: Some(temp_root.to_string_lossy().into_owned()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn zip_names(path: &Path) -> Vec<String> {
        let archive = ::zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        names
    }

    fn request(app: &Path, package: PathBuf, tweak: impl FnOnce(&mut RequestOptions)) -> BuildRequest {
        let mut options = RequestOptions {
            package,
            target: app.to_path_buf(),
            use_installer: false,
            use_gitignore: true,
            ..Default::default()
        };
        tweak(&mut options);
        BuildRequest::validate(options).unwrap()
    }

    #[tokio::test]
    async fn test_zip_build_and_cleanup() -> Result<()> {
        let app = app();
        let out = tempdir()?;
        let temp_root = tempdir()?;
        let req = request(app.path(), out.path().join("shop.zip"), |_| {});
        let mut sink = MemorySink::default();

        let report = run(&req, &test_config(temp_root.path()), &mut sink).await?;

        assert_eq!(report.path, out.path().join("shop.zip"));
        assert_eq!(report.size, fs::metadata(&report.path)?.len());
        let names = zip_names(&report.path);
        assert!(names.contains(&"composer.json".to_string()));
        assert!(names.contains(&"config/autoload/global.php".to_string()));
        assert!(names.contains(&"module/Test/Module.php".to_string()));
        assert!(!names.contains(&"config/autoload/local.php".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("vendor/")));
        assert!(!names.contains(&"composer.lock".to_string()));
        assert!(!names.contains(&".zfpack.toml".to_string()));

        assert_eq!(fs::read_dir(temp_root.path())?.count(), 0);
        assert_eq!(sink.lines.first().unwrap(), &format!("Creating package \"{}\"...", req.output.display()));
        assert!(sink.lines.last().unwrap().starts_with("[DONE] Package "));
        Ok(())
    }

    #[tokio::test]
    async fn test_module_subset_vendor_and_configs() -> Result<()> {
        let app = app();
        let out = tempdir()?;
        let temp_root = tempdir()?;
        let extra = tempdir()?;
        fs::write(extra.path().join("production.php"), "<?php return array();")?;
        fs::write(extra.path().join("notes.txt"), "not a config")?;
        let req = request(app.path(), out.path().join("shop.tar"), |o| {
            o.modules = vec!["Application".into()];
            o.include_vendor = true;
            o.use_gitignore = false;
            o.configs = Some(extra.path().to_path_buf());
        });
        let mut sink = MemorySink::default();

        run(&req, &test_config(temp_root.path()), &mut sink).await?;

        let mut archive = ::tar::Archive::new(fs::File::open(out.path().join("shop.tar"))?);
        let mut names = Vec::new();
        let mut staged_config = String::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            if name == "config/application.config.php" {
                entry.read_to_string(&mut staged_config)?;
            }
            names.push(name);
        }
        assert!(names.contains(&"module/Application/Module.php".to_string()));
        assert!(!names.contains(&"module/Test/Module.php".to_string()));
        assert!(names.contains(&"vendor/autoload.php".to_string()));
        assert!(names.contains(&"composer.lock".to_string()));
        assert!(names.contains(&"config/autoload/local.php".to_string()));
        assert!(names.contains(&"config/autoload/production.php".to_string()));
        assert!(!names.contains(&"config/autoload/notes.txt".to_string()));
        assert!(staged_config.contains("'ZfcBase'"));
        assert!(staged_config.contains("'Application'"));
        assert!(!staged_config.contains("'Test'"));
        Ok(())
    }

    #[tokio::test]
    async fn test_zpk_build() -> Result<()> {
        let app = app();
        let out = tempdir()?;
        let temp_root = tempdir()?;
        let req = request(app.path(), out.path().join("shop.zpk"), |o| {
            o.app_version = Some("3.1.4".into());
        });
        let mut sink = MemorySink::default();

        let report = run(&req, &test_config(temp_root.path()), &mut sink).await?;

        let names = zip_names(&report.path);
        assert!(names.contains(&"deployment.xml".to_string()));
        assert!(names.contains(&"scripts/post_stage.php".to_string()));
        assert!(names.contains(&"zf2-logo.png".to_string()));
        assert!(names.contains(&"data/public/index.php".to_string()));
        assert!(!names.contains(&"public/index.php".to_string()));
        assert_eq!(fs::read_dir(temp_root.path())?.count(), 0);
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_failure_removes_workspace() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let app = app();
        let out = tempdir()?;
        let temp_root = tempdir()?;
        let bin = tempdir()?;
        let composer = bin.path().join("composer");
        fs::write(&composer, "#!/bin/sh\necho 'install exploded'\nexit 1\n")?;
        fs::set_permissions(&composer, fs::Permissions::from_mode(0o755))?;

        let req = request(app.path(), out.path().join("shop.zip"), |o| o.use_installer = true);
        let mut config = test_config(temp_root.path());
        config.installer.command = composer.to_string_lossy().into_owned();
        let mut sink = MemorySink::default();

        let err = run(&req, &config, &mut sink).await.unwrap_err();

        assert!(err.to_string().contains("install exploded"));
        assert!(!out.path().join("shop.zip").exists());
        assert_eq!(fs::read_dir(temp_root.path())?.count(), 0);
        assert!(sink.lines.iter().any(|l| l.starts_with("Executing ")));
        Ok(())
    }
}
