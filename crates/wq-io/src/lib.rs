//! URI-driven storage access for the water-quality data platform.
//!
//! Callers name a resource by URI alone; the scheme selects the backend:
//! - Local disk (bare paths and `file://`)
//! - Amazon S3 (`s3://`)
//! - Google Cloud Storage (`gs://`, `gcs://`)
//! - Plain HTTP(S) (`http://`, `https://`)
//!
//! On top of the [`filesystem::FileSystem`] handles this crate provides
//! existence probes and recursive discovery, a streaming downloader, GDAL
//! VSI address construction, and public-URL resolution with Last-Modified
//! lookup. Handles are resolved per call and hold no cross-call state.

pub mod download;
pub mod filesystem;
pub mod gcs;
pub mod http;
pub mod local;
pub mod object;
pub mod probe;
pub mod public_url;
pub mod s3;
pub mod vsi;

pub use download::{download_url, DownloadProgress, DEFAULT_CHUNK_MB};
pub use filesystem::{resolve, BoxedWriter, CredentialMode, FileSystem};
pub use probe::{
    directory_exists, file_exists, find_files, find_geotiff_files, find_json_files,
    has_extension, is_geotiff, is_json,
};
pub use public_url::{default_aws_region, gs_public_url, last_modified, public_url, s3_public_url};
pub use vsi::vsi_path;
