//! Storage backend classification for resource URIs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{WqError, WqResult};

/// The storage system governing a URI.
///
/// Classification is derived purely from the URI scheme and is never stored
/// beyond the call that computes it. The enum is closed on purpose: adding a
/// backend is a compile-time-checked change everywhere it is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// Local disk (bare paths and `file://` URIs)
    Local,
    /// Amazon S3 (`s3://`)
    S3,
    /// Google Cloud Storage (`gs://` or `gcs://`)
    Gcs,
    /// Plain HTTP(S) (`http://` or `https://`)
    Http,
}

impl Backend {
    /// Classify a URI by its scheme.
    ///
    /// Rules, in precedence order: `s3` is S3; `gs`/`gcs` is GCS;
    /// `http`/`https` is HTTP; `file` or no scheme separator at all is
    /// Local. Any other scheme is rejected as `UnsupportedBackend` rather
    /// than silently falling back to Local.
    pub fn classify(uri: &str) -> WqResult<Backend> {
        let scheme = match uri.split_once("://") {
            None => return Ok(Backend::Local),
            Some((scheme, _)) => scheme.to_ascii_lowercase(),
        };

        match scheme.as_str() {
            "s3" => Ok(Backend::S3),
            "gs" | "gcs" => Ok(Backend::Gcs),
            "http" | "https" => Ok(Backend::Http),
            "file" => Ok(Backend::Local),
            _ => Err(WqError::UnsupportedBackend(uri.to_string())),
        }
    }

    /// Whether paths for this backend join with forward slashes rather than
    /// the native separator.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Backend::Local)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Local => "local",
            Backend::S3 => "s3",
            Backend::Gcs => "gcs",
            Backend::Http => "http",
        };
        write!(f, "{}", name)
    }
}
