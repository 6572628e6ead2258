//! # zfpack ZIP Archive Writer (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//!
//! ## Overview
//!
//! Writes `.zip` and `.zpk` packages with the `zip` crate. Entries are
//! deflate-compressed and keep the unix permission bits of their source file,
//! so lifecycle scripts stay executable after extraction.
//!
use super::ArchiveWriter;
use crate::core::error::Result;
use anyhow::Context;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions; // Per-entry compression and mode
use zip::{CompressionMethod, ZipWriter};

pub struct ZipArchiveWriter {
    path: PathBuf,
    writer: ZipWriter<File>,
}

impl ZipArchiveWriter {
    /// Creates a new, empty zip file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create zip archive {:?}", path))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: ZipWriter::new(file),
        })
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn add_file(&mut self, entry_name: &str, source: &Path) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(source_mode(source));

        self.writer
            .start_file(entry_name, options)
            .with_context(|| format!("Failed to start zip entry '{}'", entry_name))?;
        let mut input =
            File::open(source).with_context(|| format!("Failed to open {:?}", source))?;
        io::copy(&mut input, &mut self.writer)
            .with_context(|| format!("Failed to write {:?} into {:?}", source, self.path))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let path = self.path;
        self.writer
            .finish()
            .with_context(|| format!("Failed to finalize zip archive {:?}", path))?;
        Ok(())
    }
}

#[cfg(unix)]
fn source_mode(source: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(source)
        .map(|meta| meta.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn source_mode(_source: &Path) -> u32 {
    0o644
}
