//! # zfpack Network Utilities Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//!
//! ## Overview
//!
//! HTTP download of single files. zfpack only goes to the network when no
//! dependency installer is available locally and `composer.phar` has to be
//! fetched into the workspace.
//!
//! The body is streamed to disk chunk by chunk (`reqwest` + `futures-util`).
//! A non-success HTTP status or a broken stream is reported as
//! `ZfpackError::Download`, and any partially written file is removed.
//!
use crate::core::error::{Result, ZfpackError};
use anyhow::Context;
use futures_util::StreamExt; // Chunked body streaming
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// # Download File (`download_file`)
///
/// Downloads `url` to `dest` and returns the number of bytes written.
///
/// # Errors
///
/// Returns an `Err` if:
/// * The request fails or the server answers with a non-success status (`ZfpackError::Download`).
/// * `dest` cannot be created or written. A partially written `dest` is removed.
pub async fn download_file(url: &str, dest: &Path) -> Result<u64> {
    info!("Downloading {} to {}", url, dest.display());
    let result = download_once(url, dest).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(dest).await;
    }
    result
}

async fn download_once(url: &str, dest: &Path) -> Result<u64> {
    let download_error = |reason: String| ZfpackError::Download {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| download_error(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| download_error(e.to_string()))?;

    if !response.status().is_success() {
        anyhow::bail!(download_error(format!("HTTP {}", response.status())));
    }

    let mut file = File::create(dest)
        .await
        .with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| download_error(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .with_context(|| format!("Failed to flush {}", dest.display()))?;

    debug!("Downloaded {} bytes from {}", written, url);
    Ok(written)
}
