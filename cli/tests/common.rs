//! # zfpack CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared fixtures for the integration tests: a small Zend Framework
//! application on disk, an isolated configuration file pointing the workspace
//! root at a private temporary directory, and readers for the produced
//! archives.
//!
//! Every fixture command runs with `--composer off` unless a test opts in, so
//! no test depends on a real Composer or on the network.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

pub const APPLICATION_CONFIG: &str = "<?php\nreturn array(\n    'modules' => array(\n        'ZfcBase',\n        'ZfcUser',\n        'Application',\n        'Test',\n    ),\n    'module_listener_options' => array(\n        'module_paths' => array('./module', './vendor'),\n    ),\n);\n";

/// # Get zfpack Command (`zfpack_cmd`)
///
/// An `assert_cmd::Command` pointing to the compiled `zfpack` binary.
pub fn zfpack_cmd() -> Command {
    Command::cargo_bin("zfpack").expect("Failed to find zfpack binary for testing")
}

/// A packaging sandbox: application, output directory, workspace root and config.
pub struct Fixture {
    pub app: TempDir,
    pub out: TempDir,
    pub temp_root: TempDir,
    etc: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            app: tempdir().unwrap(),
            out: tempdir().unwrap(),
            temp_root: tempdir().unwrap(),
            etc: tempdir().unwrap(),
        };
        fixture.write_config("");
        for (path, content) in [
            ("config/application.config.php", APPLICATION_CONFIG),
            ("config/autoload/global.php", "<?php return array();"),
            ("config/autoload/database.local.php", "<?php return array('password' => 'secret');"),
            ("module/Application/Module.php", "<?php namespace Application;"),
            ("module/Application/view/index.phtml", "<h1>shop</h1>"),
            ("module/Test/Module.php", "<?php namespace Test;"),
            ("public/index.php", "<?php require 'init_autoloader.php';"),
            ("data/cache/page.cache", "cached"),
            ("vendor/autoload.php", "<?php // dev autoloader"),
            ("composer.json", "{\"require\": {}}"),
            ("composer.lock", "{}"),
            (".gitignore", "# local overrides\nconfig/autoload/*.local.php\n/data/cache/\n"),
            (".git/HEAD", "ref: refs/heads/master\n"),
        ] {
            fixture.write_app_file(path, content);
        }
        fixture
    }

    pub fn write_app_file(&self, relative: &str, content: &str) {
        let path = self.app.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Rewrites the isolated config file; `extra` is appended after the `[workspace]` table.
    pub fn write_config(&self, extra: &str) {
        let root = self.temp_root.path().to_string_lossy().replace('\\', "/");
        fs::write(
            self.config_path(),
            format!("[workspace]\ntemp_root = \"{}\"\n{}", root, extra),
        )
        .unwrap();
    }

    pub fn config_path(&self) -> PathBuf {
        self.etc.path().join("zfpack.toml")
    }

    pub fn package(&self, name: &str) -> PathBuf {
        self.out.path().join(name)
    }

    /// `zfpack build <package> --target <app> --composer off`, plus `args`.
    pub fn build(&self, package: &str, args: &[&str]) -> Command {
        let mut cmd = self.build_with_installer(package, args);
        cmd.args(["--composer", "off"]);
        cmd
    }

    /// Like `build` but leaves the installer switch to the caller.
    pub fn build_with_installer(&self, package: &str, args: &[&str]) -> Command {
        let mut cmd = zfpack_cmd();
        cmd.env("ZFPACK_CONFIG", self.config_path())
            .env_remove("RUST_LOG")
            .arg("build")
            .arg(self.package(package))
            .arg("--target")
            .arg(self.app.path())
            .args(args);
        cmd
    }

    /// Number of entries left under the workspace root.
    pub fn leftover_workspaces(&self) -> usize {
        fs::read_dir(self.temp_root.path()).unwrap().count()
    }
}

/// Sorted entry names of a zip or zpk file.
pub fn zip_entries(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

pub fn zip_read(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

/// Sorted entry names of a tar file, gunzipping first when `gzipped`.
pub fn tar_entries(path: &Path, gzipped: bool) -> Vec<String> {
    let file = fs::File::open(path).unwrap();
    let reader: Box<dyn Read> = if gzipped {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let mut archive = tar::Archive::new(reader);
    let mut names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn has(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n == name)
}
