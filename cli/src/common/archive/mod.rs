//! # zfpack Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! This module turns a fully staged directory into the requested package file.
//! The five supported formats form the closed `ArchiveFormat` enum:
//!
//! | Format   | Container | Walked root                | Finalization                         |
//! |----------|-----------|----------------------------|--------------------------------------|
//! | `zip`    | zip       | staging dir                | none                                 |
//! | `zpk`    | zip       | parent of the `data/` dir  | none                                 |
//! | `tar`    | tar       | staging dir                | none                                 |
//! | `tar.gz` | tar       | staging dir                | gzip to `.tar.gz`, drop the `.tar`   |
//! | `tgz`    | tar       | staging dir                | as `tar.gz`, then rename to `.tgz`   |
//!
//! ## Architecture
//!
//! - **`ArchiveWriter`**: the capability every container implements (`add_file`, `finish`).
//! - **`zip`**: `ZipArchiveWriter` over the `zip` crate (deflate, unix permissions kept).
//! - **`tar`**: `TarArchiveWriter` over the `tar` crate.
//! - **`compression`**: `gzip_file`, which always writes `<source>.gz` next to the source.
//!
//! `archive` walks the root with `walkdir` (files only, sorted by name) and adds
//! each file under its root-relative path with `/` separators.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{self, ArchiveFormat};
//!
//! let format = ArchiveFormat::from_path(Path::new("shop.tgz"))?;
//! archive::archive(&staging_dir, Path::new("shop.tgz"), format)?;
//! ```
//!
pub mod compression;
pub mod tar;
pub mod zip;

use crate::core::error::{Result, ZfpackError}; // Standard Result and error types
use anyhow::Context; // For error context wrapping
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn}; // Logging utilities
use walkdir::WalkDir; // Sorted recursive traversal

/// Package formats selected by the output file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    Tgz,
    Zpk,
}

impl ArchiveFormat {
    /// Every format, longest suffix first so `.tar.gz` wins over `.tar`.
    pub const ALL: [ArchiveFormat; 5] = [
        ArchiveFormat::TarGz,
        ArchiveFormat::Tgz,
        ArchiveFormat::Tar,
        ArchiveFormat::Zip,
        ArchiveFormat::Zpk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Tgz => "tgz",
            ArchiveFormat::Zpk => "zpk",
        }
    }

    /// File suffix including the leading dot.
    pub fn suffix(self) -> String {
        format!(".{}", self.name())
    }

    /// Detects the format from the file name of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::ALL
            .into_iter()
            .find(|format| {
                file_name.len() > format.suffix().len() && file_name.ends_with(&format.suffix())
            })
            .ok_or_else(|| ZfpackError::UnknownFormat(file_name).into())
    }

    /// File name of `path` without the format suffix.
    pub fn base_name(self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match file_name.strip_suffix(&self.suffix()) {
            Some(base) => base.to_string(),
            None => file_name,
        }
    }

    pub fn is_gzipped(self) -> bool {
        matches!(self, ArchiveFormat::TarGz | ArchiveFormat::Tgz)
    }

    /// Path the container is written to before finalization.
    ///
    /// Gzipped formats first build `<base>.tar` next to the requested output.
    pub fn container_path(self, output: &Path) -> PathBuf {
        if self.is_gzipped() {
            output.with_file_name(format!("{}.tar", self.base_name(output)))
        } else {
            output.to_path_buf()
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A container being written file by file.
pub trait ArchiveWriter {
    /// Adds the file at `source` under `entry_name` (relative, `/`-separated).
    fn add_file(&mut self, entry_name: &str, source: &Path) -> Result<()>;

    /// Completes the container and flushes it to disk.
    fn finish(self: Box<Self>) -> Result<()>;
}

fn open_writer(format: ArchiveFormat, container: &Path) -> Result<Box<dyn ArchiveWriter>> {
    Ok(match format {
        ArchiveFormat::Zip | ArchiveFormat::Zpk => Box::new(zip::ZipArchiveWriter::create(container)?),
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::Tgz => {
            Box::new(tar::TarArchiveWriter::create(container)?)
        }
    })
}

/// # Write Archive (`archive`)
///
/// Writes `staging_root` into `output` using `format`.
///
/// For `zpk`, `staging_root` is the `data/` directory of the workspace and the
/// archive is built from its parent.
///
/// # Arguments
///
/// * `staging_root` - The fully staged application tree.
/// * `output` - The package file to create. It must not exist yet.
/// * `format` - The format detected from the suffix of `output`.
///
/// # Returns
///
/// * `Result<()>` - `Ok(())` once `output` holds the complete package.
///
/// # Errors
///
/// Returns an `Err` if the tree cannot be walked, or if the container cannot be
/// written, compressed or renamed. On error the partial container, any
/// intermediate `.tar` / `.tar.gz` file and the partial `output` are removed.
pub fn archive(staging_root: &Path, output: &Path, format: ArchiveFormat) -> Result<()> {
    let result = write_archive(staging_root, output, format);
    if result.is_err() {
        discard_partial(output, format);
    }
    result
}

fn write_archive(staging_root: &Path, output: &Path, format: ArchiveFormat) -> Result<()> {
    let walk_root = match format {
        ArchiveFormat::Zpk => staging_root.parent().ok_or_else(|| {
            ZfpackError::FileSystem(format!(
                "ZPK staging directory {:?} has no parent",
                staging_root
            ))
        })?,
        _ => staging_root,
    };
    let container = format.container_path(output);
    info!(
        "Writing {} archive {:?} from {:?}",
        format, container, walk_root
    );

    // Step 1: Fill the container, regular files only, in a stable order
    let mut writer = open_writer(format, &container)?;
    let mut entries = 0usize;
    for entry in WalkDir::new(walk_root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", walk_root))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry_name(walk_root, entry.path())?;
        debug!("Adding {}", name);
        writer.add_file(&name, entry.path())?;
        entries += 1;
    }
    writer.finish()?;
    info!("Archived {} files", entries);

    // Step 2: Gzipped formats compress `<base>.tar` into `<base>.tar.gz`
    if format.is_gzipped() {
        let compressed = compression::gzip_file(&container)?;
        fs::remove_file(&container)
            .with_context(|| format!("Failed to remove intermediate tar {:?}", container))?;
        // Only `tgz` differs here: `<base>.tar.gz` becomes `<base>.tgz`.
        if compressed != output {
            fs::rename(&compressed, output).with_context(|| {
                format!("Failed to rename {:?} to {:?}", compressed, output)
            })?;
        }
    }
    Ok(())
}

/// Removes whatever a failed `write_archive` left next to `output`.
///
/// `output` did not exist before the build, so any file at that path is partial.
fn discard_partial(output: &Path, format: ArchiveFormat) {
    let container = format.container_path(output);
    let mut leftovers = vec![output.to_path_buf(), container.clone()];
    if format.is_gzipped() {
        let mut gzipped = container.into_os_string();
        gzipped.push(".gz");
        leftovers.push(PathBuf::from(gzipped));
    }
    for path in leftovers {
        if path.is_file() {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed partial archive file {:?}", path),
                Err(e) => warn!("Failed to remove partial archive file {:?}: {}", path, e),
            }
        }
    }
}

/// Root-relative entry name with `/` separators.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).with_context(|| {
        format!("{:?} is not inside the archive root {:?}", path, root)
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn staged_tree(root: &Path) {
        fs::create_dir_all(root.join("public/css")).unwrap();
        fs::write(root.join("public/index.php"), "<?php require 'init.php';").unwrap();
        fs::write(root.join("public/css/style.css"), "body {}").unwrap();
        fs::write(root.join("composer.json"), "{}").unwrap();
    }

    fn tar_names(bytes: impl Read) -> Vec<String> {
        let mut archive = ::tar::Archive::new(bytes);
        archive
            .entries()
            .unwrap()
            .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_from_path() {
        let cases = [
            ("shop.zip", ArchiveFormat::Zip),
            ("shop.tar", ArchiveFormat::Tar),
            ("shop.tar.gz", ArchiveFormat::TarGz),
            ("shop.tgz", ArchiveFormat::Tgz),
            ("/tmp/out/shop.zpk", ArchiveFormat::Zpk),
        ];
        for (path, expected) in cases {
            assert_eq!(ArchiveFormat::from_path(Path::new(path)).unwrap(), expected);
        }
    }

    #[test]
    fn test_from_path_rejects_unknown_suffix() {
        let err = ArchiveFormat::from_path(Path::new("shop.rar")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ZfpackError>(),
            Some(ZfpackError::UnknownFormat(name)) if name == "shop.rar"
        ));
        assert!(ArchiveFormat::from_path(Path::new(".zip")).is_err());
    }

    #[test]
    fn test_base_name_and_container_path() {
        let output = Path::new("/out/shop-1.0.tar.gz");
        assert_eq!(ArchiveFormat::TarGz.base_name(output), "shop-1.0");
        assert_eq!(
            ArchiveFormat::TarGz.container_path(output),
            Path::new("/out/shop-1.0.tar")
        );
        assert_eq!(
            ArchiveFormat::Tgz.container_path(Path::new("/out/shop.tgz")),
            Path::new("/out/shop.tar")
        );
        assert_eq!(
            ArchiveFormat::Zip.container_path(Path::new("/out/shop.zip")),
            Path::new("/out/shop.zip")
        );
    }

    #[test]
    fn test_zip_archive_entries() -> Result<()> {
        let staging = tempdir()?;
        let out = tempdir()?;
        staged_tree(staging.path());
        let output = out.path().join("shop.zip");

        archive(staging.path(), &output, ArchiveFormat::Zip)?;

        let mut zip = ::zip::ZipArchive::new(fs::File::open(&output)?)?;
        let mut names: Vec<String> = zip.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["composer.json", "public/css/style.css", "public/index.php"]
        );
        let mut content = String::new();
        zip.by_name("public/index.php")?.read_to_string(&mut content)?;
        assert_eq!(content, "<?php require 'init.php';");
        Ok(())
    }

    #[test]
    fn test_zpk_walks_parent_of_data() -> Result<()> {
        let workspace = tempdir()?;
        let out = tempdir()?;
        let data = workspace.path().join("data");
        staged_tree(&data);
        fs::write(workspace.path().join("deployment.xml"), "<package/>")?;
        fs::create_dir_all(workspace.path().join("scripts"))?;
        fs::write(workspace.path().join("scripts/post_stage.php"), "<?php")?;
        let output = out.path().join("shop.zpk");

        archive(&data, &output, ArchiveFormat::Zpk)?;

        let zip = ::zip::ZipArchive::new(fs::File::open(&output)?)?;
        let names: Vec<&str> = zip.file_names().collect();
        assert!(names.contains(&"deployment.xml"));
        assert!(names.contains(&"scripts/post_stage.php"));
        assert!(names.contains(&"data/public/index.php"));
        assert!(!names.contains(&"public/index.php"));
        Ok(())
    }

    #[test]
    fn test_plain_tar() -> Result<()> {
        let staging = tempdir()?;
        let out = tempdir()?;
        staged_tree(staging.path());
        let output = out.path().join("shop.tar");

        archive(staging.path(), &output, ArchiveFormat::Tar)?;

        let names = tar_names(fs::File::open(&output)?);
        assert_eq!(
            names,
            vec!["composer.json", "public/css/style.css", "public/index.php"]
        );
        Ok(())
    }

    #[test]
    fn test_tgz_leaves_no_intermediates() -> Result<()> {
        let staging = tempdir()?;
        let out = tempdir()?;
        staged_tree(staging.path());
        let output = out.path().join("shop.tgz");

        archive(staging.path(), &output, ArchiveFormat::Tgz)?;

        let mut remaining: Vec<String> = fs::read_dir(out.path())?
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["shop.tgz"]);

        let names = tar_names(flate2::read::GzDecoder::new(fs::File::open(&output)?));
        assert!(names.contains(&"public/index.php".to_string()));
        Ok(())
    }

    #[test]
    fn test_tar_gz_output() -> Result<()> {
        let staging = tempdir()?;
        let out = tempdir()?;
        staged_tree(staging.path());
        let output = out.path().join("shop.tar.gz");

        archive(staging.path(), &output, ArchiveFormat::TarGz)?;

        assert!(output.is_file());
        assert!(!out.path().join("shop.tar").exists());
        let names = tar_names(flate2::read::GzDecoder::new(fs::File::open(&output)?));
        assert_eq!(names.len(), 3);
        Ok(())
    }

    #[test]
    fn test_failed_archive_leaves_no_partial_files() -> Result<()> {
        let out = tempdir()?;
        let missing = out.path().join("not-staged");

        for name in ["shop.tar.gz", "shop.tgz", "shop.zip"] {
            let output = out.path().join(name);
            let format = ArchiveFormat::from_path(&output)?;
            assert!(archive(&missing, &output, format).is_err());
        }

        let remaining: Vec<_> = fs::read_dir(out.path())?.collect();
        assert!(remaining.is_empty(), "left behind: {:?}", remaining);
        Ok(())
    }
}
