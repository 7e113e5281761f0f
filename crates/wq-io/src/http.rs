//! Read-only HTTP(S) handle.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use wq_common::{Backend, WqError, WqResult};

use crate::filesystem::{BoxedWriter, FileSystem};

/// Probe-only handle for plain HTTP(S) resources.
///
/// Existence is a HEAD request. HTTP exposes no directory listing, so a
/// URL is never a directory, walks are empty, and writes are rejected.
pub struct HttpFs {
    client: Client,
}

impl HttpFs {
    pub fn new() -> WqResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| WqError::BackendUnavailable(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FileSystem for HttpFs {
    fn backend(&self) -> Backend {
        Backend::Http
    }

    async fn exists(&self, uri: &str) -> WqResult<bool> {
        let response = self
            .client
            .head(uri)
            .send()
            .await
            .map_err(|e| WqError::HttpFailure(format!("HEAD {} failed: {}", uri, e)))?;
        Ok(response.status().is_success())
    }

    async fn is_file(&self, uri: &str) -> WqResult<bool> {
        self.exists(uri).await
    }

    async fn is_dir(&self, _uri: &str) -> WqResult<bool> {
        Ok(false)
    }

    async fn walk(&self, _uri: &str) -> WqResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn make_dirs(&self, uri: &str) -> WqResult<()> {
        Err(WqError::Storage(format!(
            "HTTP destinations are read-only: {}",
            uri
        )))
    }

    async fn open_write(&self, uri: &str, _buffer_bytes: usize) -> WqResult<BoxedWriter> {
        Err(WqError::Storage(format!(
            "HTTP destinations are read-only: {}",
            uri
        )))
    }
}
