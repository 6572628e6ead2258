//! # zfpack Compression Utilities (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//!
//! ## Overview
//!
//! Gzip compression of finished tar containers, using `flate2`.
//! `gzip_file` mirrors the classic `gzip` tool: the compressed copy is always
//! written next to the source with `.gz` appended to its full file name, and
//! the source itself is left untouched. Renaming and cleanup are the caller's
//! business (see `archive::archive`).
//!
use crate::core::error::Result;
use anyhow::Context;
use flate2::write::GzEncoder; // Streaming gzip writer
use flate2::Compression;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compresses `source` into `<source>.gz` and returns the new path.
///
/// `source` itself is left in place.
///
/// # Errors
///
/// Returns an `Err` if `source` cannot be read or the `.gz` file cannot be written.
pub fn gzip_file(source: &Path) -> Result<PathBuf> {
    let mut target_name = OsString::from(source.as_os_str());
    target_name.push(".gz");
    let target = PathBuf::from(target_name);

    let input = File::open(source).with_context(|| format!("Failed to open {:?}", source))?;
    let output = File::create(&target).with_context(|| format!("Failed to create {:?}", target))?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    io::copy(&mut BufReader::new(input), &mut encoder)
        .with_context(|| format!("Failed to compress {:?}", source))?;
    encoder
        .finish()
        .context("Failed to finish gzip compression stream")?
        .flush()
        .with_context(|| format!("Failed to flush {:?}", target))?;

    debug!("Compressed {:?} to {:?}", source, target);
    Ok(target)
}
