//! Streaming download from HTTP(S) sources to any writable backend.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

use wq_common::{Backend, WqError, WqResult};

use crate::filesystem::{resolve, CredentialMode};

/// Default transfer chunk size in megabytes.
pub const DEFAULT_CHUNK_MB: usize = 100;

/// Best-effort transfer progress, sized from the Content-Length header when
/// the server provides one.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub url: String,
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: u64,
    pub started_at: DateTime<Utc>,
}

impl DownloadProgress {
    pub fn new(url: &str, total_bytes: Option<u64>) -> Self {
        Self {
            url: url.to_string(),
            total_bytes,
            downloaded_bytes: 0,
            started_at: Utc::now(),
        }
    }

    pub fn percent_complete(&self) -> Option<f64> {
        self.total_bytes
            .map(|total| (self.downloaded_bytes as f64 / total as f64) * 100.0)
    }

    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0;
        if elapsed > 0.0 {
            self.downloaded_bytes as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Download `url` to `dest_uri`, streaming the body straight through the
/// destination's filesystem handle. Returns `dest_uri`.
///
/// The destination may be a local path or an object-storage URI; missing
/// parent directories are created through the handle. `chunk_mb` sizes the
/// write buffer (and the multipart part size on object storage); `None`
/// takes [`DEFAULT_CHUNK_MB`]. A non-success status fails before anything
/// is written. A transport failure mid-stream leaves whatever was already
/// written, so callers needing atomicity should download to a temporary URI
/// and rename.
#[instrument(skip(url, dest_uri, chunk_mb), fields(url = %url, dest = %dest_uri))]
pub async fn download_url(
    url: &str,
    dest_uri: &str,
    chunk_mb: Option<usize>,
) -> WqResult<String> {
    if Backend::classify(url)? != Backend::Http {
        return Err(WqError::NotAUri(format!(
            "download source must be an HTTP(S) URL: {}",
            url
        )));
    }
    let chunk_bytes = chunk_mb.unwrap_or(DEFAULT_CHUNK_MB) * 1024 * 1024;

    let fs = resolve(dest_uri, CredentialMode::Authenticated)?;
    let parent = fs.parent(dest_uri);
    if !parent.is_empty() && !fs.is_dir(&parent).await? {
        fs.make_dirs(&parent).await?;
    }

    let client = Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| WqError::HttpFailure(format!("HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| WqError::HttpFailure(format!("GET {} failed: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(WqError::HttpFailure(format!(
            "GET {} returned {}",
            url,
            response.status()
        )));
    }

    let mut progress = DownloadProgress::new(url, response.content_length());
    let mut writer = fs.open_write(dest_uri, chunk_bytes).await?;
    let mut stream = response.bytes_stream();
    let mut next_report = chunk_bytes as u64;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| WqError::HttpFailure(format!("transfer from {} failed: {}", url, e)))?;
        writer.write_all(&chunk).await?;
        progress.downloaded_bytes += chunk.len() as u64;

        if progress.downloaded_bytes >= next_report {
            match progress.percent_complete() {
                Some(percent) => info!(
                    bytes = progress.downloaded_bytes,
                    percent,
                    rate = progress.bytes_per_second(),
                    "downloading"
                ),
                None => info!(
                    bytes = progress.downloaded_bytes,
                    rate = progress.bytes_per_second(),
                    "downloading"
                ),
            }
            next_report += chunk_bytes as u64;
        }
    }
    writer.shutdown().await?;

    info!(bytes = progress.downloaded_bytes, "download complete");
    Ok(dest_uri.to_string())
}
