//! Backend-dispatched filesystem handles.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWrite;

use wq_common::{uri, Backend, WqResult};

use crate::gcs;
use crate::http::HttpFs;
use crate::local::LocalFs;
use crate::s3;

/// Credential posture for a storage handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialMode {
    /// Unsigned requests; public data only.
    Anonymous,
    /// Ambient credentials from the environment.
    Authenticated,
}

/// Writer returned by [`FileSystem::open_write`]. Callers must `shutdown()`
/// it to flush buffers and, on object storage, complete the upload.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Uniform operations over one storage backend.
///
/// Paths passed to a handle are URIs; each implementation strips its own
/// scheme, so `s3://bucket/key` and `bucket/key` address the same object on
/// an S3 handle.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Which backend this handle talks to.
    fn backend(&self) -> Backend;

    /// Whether the path exists at all (file or directory).
    async fn exists(&self, uri: &str) -> WqResult<bool>;

    /// Whether the path exists and is a regular file (an object, for object
    /// storage).
    async fn is_file(&self, uri: &str) -> WqResult<bool>;

    /// Whether the path exists and is a directory (a non-empty key prefix,
    /// for object storage).
    async fn is_dir(&self, uri: &str) -> WqResult<bool>;

    /// All regular files under the path, recursively, as backend-native
    /// paths without a scheme prefix.
    async fn walk(&self, uri: &str) -> WqResult<Vec<String>>;

    /// Create the directory and any missing ancestors. A no-op on backends
    /// where directories are implicit.
    async fn make_dirs(&self, uri: &str) -> WqResult<()>;

    /// Open the path for writing, replacing any existing content.
    /// `buffer_bytes` sizes the write buffer (the multipart part size on
    /// object storage).
    async fn open_write(&self, uri: &str, buffer_bytes: usize) -> WqResult<BoxedWriter>;

    /// Parent of the path, scheme preserved.
    fn parent(&self, uri: &str) -> String {
        uri::parent(uri)
    }

    /// Re-attach the scheme prefix to a backend-native path from [`walk`].
    ///
    /// [`walk`]: FileSystem::walk
    fn qualify(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Resolve a filesystem handle for a URI.
///
/// The backend comes from [`Backend::classify`]; `mode` selects anonymous or
/// ambient-credential access for the object-storage backends (local and HTTP
/// handles ignore it). Construction failures surface as
/// `WqError::BackendUnavailable` and never yield a partially usable handle.
pub fn resolve(uri: &str, mode: CredentialMode) -> WqResult<Arc<dyn FileSystem>> {
    match Backend::classify(uri)? {
        Backend::Local => Ok(Arc::new(LocalFs::new())),
        Backend::S3 => Ok(Arc::new(s3::filesystem(uri, mode)?)),
        Backend::Gcs => Ok(Arc::new(gcs::filesystem(uri, mode)?)),
        Backend::Http => Ok(Arc::new(HttpFs::new()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wq_common::WqError;

    #[test]
    fn test_resolve_dispatches_on_scheme() {
        let fs = resolve("/data/scene.tif", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.backend(), Backend::Local);

        let fs = resolve("s3://bucket/key.tif", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.backend(), Backend::S3);

        let fs = resolve("gs://bucket/key.tif", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.backend(), Backend::Gcs);

        let fs = resolve("https://example.com/a.tif", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.backend(), Backend::Http);
    }

    #[test]
    fn test_resolve_rejects_unknown_scheme() {
        assert!(matches!(
            resolve("ftp://host/file", CredentialMode::Anonymous),
            Err(WqError::UnsupportedBackend(_))
        ));
    }

    #[test]
    fn test_qualify_reattaches_scheme() {
        let fs = resolve("s3://bucket/prefix", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.qualify("bucket/prefix/a.tif"), "s3://bucket/prefix/a.tif");

        // Both GCS spellings qualify with the canonical gs:// prefix.
        let fs = resolve("gcs://bucket/prefix", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.qualify("bucket/prefix/a.tif"), "gs://bucket/prefix/a.tif");

        let fs = resolve("/data", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.qualify("/data/a.tif"), "/data/a.tif");
    }
}
