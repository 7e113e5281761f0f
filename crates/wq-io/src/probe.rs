//! Existence checks, extension predicates, and recursive discovery.
//!
//! Probes always resolve anonymous handles: discovery targets public data,
//! and a missing path is an answer (`false` or an empty listing), not an
//! error. Backend faults still surface as errors.

use regex::Regex;
use tracing::{debug, instrument};

use wq_common::uri::{extension, file_name};
use wq_common::{WqError, WqResult};

use crate::filesystem::{resolve, CredentialMode};

/// Extensions accepted as GeoTIFF rasters.
pub const GEOTIFF_EXTENSIONS: &[&str] = &[".tif", ".tiff", ".gtiff"];

/// Extensions accepted as JSON documents.
pub const JSON_EXTENSIONS: &[&str] = &[".json"];

/// Whether the URI names an existing regular file.
pub async fn file_exists(uri: &str) -> WqResult<bool> {
    let fs = resolve(uri, CredentialMode::Anonymous)?;
    Ok(fs.exists(uri).await? && fs.is_file(uri).await?)
}

/// Whether the URI names an existing directory (a non-empty prefix, on
/// object storage).
pub async fn directory_exists(uri: &str) -> WqResult<bool> {
    let fs = resolve(uri, CredentialMode::Anonymous)?;
    Ok(fs.exists(uri).await? && fs.is_dir(uri).await?)
}

/// Case-insensitive membership test on the final extension.
pub fn has_extension(path: &str, accepted: &[&str]) -> bool {
    match extension(path) {
        Some(ext) => accepted.iter().any(|a| ext.eq_ignore_ascii_case(a)),
        None => false,
    }
}

pub fn is_geotiff(path: &str) -> bool {
    has_extension(path, GEOTIFF_EXTENSIONS)
}

pub fn is_json(path: &str) -> bool {
    has_extension(path, JSON_EXTENSIONS)
}

/// Recursively discover files under `root_uri`.
///
/// A file is kept when it passes `predicate` and its base name matches
/// `name_pattern` (regex search, not anchored). Results keep the walk order
/// and carry an `s3://` or `gs://` prefix on object backends; local paths
/// come back bare. A missing root yields an empty list.
#[instrument(skip(root_uri, name_pattern, predicate), fields(root = %root_uri, pattern = %name_pattern))]
pub async fn find_files<F>(root_uri: &str, name_pattern: &str, predicate: F) -> WqResult<Vec<String>>
where
    F: Fn(&str) -> bool,
{
    let pattern = Regex::new(name_pattern)
        .map_err(|e| WqError::InvalidPattern(format!("{}: {}", name_pattern, e)))?;
    let fs = resolve(root_uri, CredentialMode::Anonymous)?;

    let mut found = Vec::new();
    for path in fs.walk(root_uri).await? {
        if predicate(&path) && pattern.is_match(file_name(&path)) {
            found.push(fs.qualify(&path));
        }
    }

    debug!(count = found.len(), "discovery finished");
    Ok(found)
}

/// All GeoTIFF files under `root_uri` whose base name matches
/// `name_pattern` (pass `".*"` for every file).
pub async fn find_geotiff_files(root_uri: &str, name_pattern: &str) -> WqResult<Vec<String>> {
    find_files(root_uri, name_pattern, is_geotiff).await
}

/// All JSON files under `root_uri` whose base name matches `name_pattern`.
pub async fn find_json_files(root_uri: &str, name_pattern: &str) -> WqResult<Vec<String>> {
    find_files(root_uri, name_pattern, is_json).await
}
