//! # zfpack TAR Archive Writer (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! Writes uncompressed tar containers with the `tar` crate. The `.tar.gz` and
//! `.tgz` formats are produced by writing a plain tar with this writer first and
//! compressing it afterwards (see `compression::gzip_file`).
//!
//! Each file is appended with `append_path_with_name`, so the header carries
//! the source file's size, mode and mtime under the root-relative entry name.
//!
use super::ArchiveWriter;
use crate::core::error::Result;
use anyhow::Context; // For error context wrapping
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct TarArchiveWriter {
    path: PathBuf,
    builder: tar::Builder<File>,
}

impl TarArchiveWriter {
    /// Creates a new, empty tar file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create tar archive {:?}", path))?;
        let mut builder = tar::Builder::new(file);
        builder.follow_symlinks(true);
        Ok(Self {
            path: path.to_path_buf(),
            builder,
        })
    }
}

impl ArchiveWriter for TarArchiveWriter {
    fn add_file(&mut self, entry_name: &str, source: &Path) -> Result<()> {
        self.builder
            .append_path_with_name(source, entry_name)
            .with_context(|| {
                format!(
                    "Failed to add '{}' to the tar archive {:?}",
                    entry_name, self.path
                )
            })
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let path = self.path;
        // into_inner writes the closing records; the file is flushed on drop.
        self.builder
            .into_inner()
            .with_context(|| format!("Failed to finalize tar archive {:?}", path))?;
        Ok(())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tar::Archive;
    use tempfile::tempdir;

    #[test]
    fn test_tar_writer_basic() -> Result<()> {
        let temp_dir = tempdir()?;
        let dir_path = temp_dir.path();
        fs::write(dir_path.join("file1.txt"), "hello")?;
        fs::create_dir(dir_path.join("subdir"))?;
        fs::write(dir_path.join("subdir/file2.txt"), "world")?;
        let output = dir_path.join("out.tar");

        let mut writer: Box<dyn ArchiveWriter> = Box::new(TarArchiveWriter::create(&output)?);
        writer.add_file("file1.txt", &dir_path.join("file1.txt"))?;
        writer.add_file("subdir/file2.txt", &dir_path.join("subdir/file2.txt"))?;
        writer.finish()?;

        let mut tar_archive = Archive::new(File::open(&output)?);
        let mut found = Vec::new();
        for entry_result in tar_archive.entries()? {
            let mut entry = entry_result?;
            let path = entry.path()?.to_string_lossy().replace('\\', "/");
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            found.push((path, content));
        }
        assert_eq!(
            found,
            vec![
                ("file1.txt".to_string(), "hello".to_string()),
                ("subdir/file2.txt".to_string(), "world".to_string()),
            ]
        );
        Ok(())
    }
}
