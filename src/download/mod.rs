//! Streaming asset downloads with terminal progress.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::bbb::RemoteAsset;

/// Stream `asset` into `destination/<asset file name>` and return the path.
pub async fn download_asset(asset: RemoteAsset, destination: &Path) -> Result<PathBuf> {
    let total = asset.content_length();
    let RemoteAsset {
        file_name,
        url,
        response,
    } = asset;
    let path = destination.join(&file_name);

    let pb = create_progress_bar(total, &file_name);
    let mut file = fs::File::create(&path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Download of {url} was interrupted"))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()
        .await
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    pb.finish_and_clear();

    info!(
        "Downloaded {} ({:.1} MB)",
        file_name,
        downloaded as f64 / 1_000_000.0
    );
    Ok(path)
}

/// Byte progress bar when the size is known, a spinner otherwise.
fn create_progress_bar(total: Option<u64>, label: &str) -> ProgressBar {
    let pb = match total {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("━╸━"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} {bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    };
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
