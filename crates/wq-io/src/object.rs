//! Object-store filesystem shared by the S3 and GCS backends.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::ObjectStore;
use tracing::debug;

use wq_common::{strip_scheme, Backend, WqError, WqResult};

use crate::filesystem::{BoxedWriter, FileSystem};

/// A filesystem handle over one bucket of an [`ObjectStore`].
///
/// Keys are derived from URIs by stripping the scheme and the bucket name,
/// so `s3://bucket/a/b` and `bucket/a/b` address the same object. Directory
/// semantics are prefix semantics: a "directory" exists when anything is
/// stored under it.
pub struct ObjectFs {
    store: Arc<dyn ObjectStore>,
    backend: Backend,
    scheme: &'static str,
    bucket: String,
}

impl ObjectFs {
    pub(crate) fn new(
        store: Arc<dyn ObjectStore>,
        backend: Backend,
        scheme: &'static str,
        bucket: String,
    ) -> Self {
        Self {
            store,
            backend,
            scheme,
            bucket,
        }
    }

    /// Object key for a URI, relative to this handle's bucket.
    fn key_of(&self, uri: &str) -> String {
        let native = strip_scheme(uri);
        if native == self.bucket {
            return String::new();
        }
        match native.strip_prefix(&self.bucket) {
            Some(rest) if rest.starts_with('/') => rest.trim_matches('/').to_string(),
            _ => native.trim_matches('/').to_string(),
        }
    }

    fn prefix_of(&self, uri: &str) -> Option<Path> {
        let key = self.key_of(uri);
        (!key.is_empty()).then(|| Path::from(key.as_str()))
    }

    fn storage_err(&self, op: &str, uri: &str, err: object_store::Error) -> WqError {
        WqError::Storage(format!("{} {} failed: {}", op, uri, err))
    }
}

#[async_trait]
impl FileSystem for ObjectFs {
    fn backend(&self) -> Backend {
        self.backend
    }

    async fn exists(&self, uri: &str) -> WqResult<bool> {
        Ok(self.is_file(uri).await? || self.is_dir(uri).await?)
    }

    async fn is_file(&self, uri: &str) -> WqResult<bool> {
        let key = self.key_of(uri);
        if key.is_empty() {
            // The bucket root is never a regular object.
            return Ok(false);
        }
        match self.store.head(&Path::from(key.as_str())).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(self.storage_err("head", uri, e)),
        }
    }

    async fn is_dir(&self, uri: &str) -> WqResult<bool> {
        let prefix = self.prefix_of(uri);
        let listing = self
            .store
            .list_with_delimiter(prefix.as_ref())
            .await
            .map_err(|e| self.storage_err("list", uri, e))?;
        Ok(!listing.objects.is_empty() || !listing.common_prefixes.is_empty())
    }

    async fn walk(&self, uri: &str) -> WqResult<Vec<String>> {
        let prefix = self.prefix_of(uri);
        let mut paths = Vec::new();

        let mut stream = self.store.list(prefix.as_ref());
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| self.storage_err("list", uri, e))?
        {
            paths.push(format!("{}/{}", self.bucket, meta.location));
        }

        debug!(bucket = %self.bucket, count = paths.len(), "walked prefix");
        Ok(paths)
    }

    async fn make_dirs(&self, _uri: &str) -> WqResult<()> {
        // Prefixes exist implicitly once an object is written under them.
        Ok(())
    }

    async fn open_write(&self, uri: &str, buffer_bytes: usize) -> WqResult<BoxedWriter> {
        let key = self.key_of(uri);
        if key.is_empty() {
            return Err(WqError::Storage(format!(
                "cannot write to bucket root: {}",
                uri
            )));
        }
        Ok(Box::new(BufWriter::with_capacity(
            Arc::clone(&self.store),
            Path::from(key.as_str()),
            buffer_bytes,
        )))
    }

    fn qualify(&self, path: &str) -> String {
        format!("{}://{}", self.scheme, path)
    }
}
