//! URI and path helpers shared by every backend.
//!
//! URIs are opaque strings; the only mutations allowed are explicit join and
//! prefix operations, which must preserve backend-appropriate separators
//! (native join for local paths, forward-slash join everywhere else).

use std::path::{Path, PathBuf};

use url::Url;

use crate::backend::Backend;
use crate::error::{WqError, WqResult};

/// Join path segments onto a base URI with backend-appropriate separators.
///
/// Local bases use the platform path join; remote bases always join with
/// forward slashes. Empty segments are skipped.
pub fn join_url(base: &str, parts: &[&str]) -> WqResult<String> {
    if Backend::classify(base)?.is_remote() {
        let mut joined = base.trim_end_matches('/').to_string();
        for part in parts {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                joined.push('/');
                joined.push_str(part);
            }
        }
        Ok(joined)
    } else {
        let mut joined = PathBuf::from(strip_scheme(base));
        for part in parts {
            if !part.is_empty() {
                joined.push(part);
            }
        }
        Ok(joined.to_string_lossy().into_owned())
    }
}

/// Remove the scheme prefix from a URI, leaving the backend-native path.
///
/// HTTP URLs are returned unchanged: their native path is the full URL.
pub fn strip_scheme(uri: &str) -> &str {
    match uri.split_once("://") {
        Some((scheme, rest)) if !scheme.eq_ignore_ascii_case("http")
            && !scheme.eq_ignore_ascii_case("https") =>
        {
            rest
        }
        _ => uri,
    }
}

/// Parent of a URI, preserving the scheme prefix and separators.
///
/// The parent of a bucket root (or a bare file name) is the empty string for
/// local paths and the input itself for remote roots.
pub fn parent(uri: &str) -> String {
    match Backend::classify(uri) {
        Ok(backend) if backend.is_remote() => {
            let (prefix, rest) = uri.split_once("://").unwrap_or(("", uri));
            match rest.trim_end_matches('/').rsplit_once('/') {
                Some((head, _)) if !prefix.is_empty() => format!("{}://{}", prefix, head),
                Some((head, _)) => head.to_string(),
                None => uri.to_string(),
            }
        }
        _ => Path::new(strip_scheme(uri))
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Base name of a URI, i.e. everything after the last separator.
pub fn file_name(uri: &str) -> &str {
    uri.rsplit(['/', '\\']).next().unwrap_or(uri)
}

/// Final extension of a path, dot included (`".tif"`), if any.
///
/// A leading dot alone does not count as an extension, so dotfiles have
/// none. Only the last extension is reported: `scene.tar.gz` is `".gz"`.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => Some(&name[idx..]),
        _ => None,
    }
}

/// Parse a `scheme://bucket/key` URI into its bucket and key, with any
/// leading slash stripped from the key and percent-encoding preserved.
pub fn parse_bucket_key(uri: &str) -> WqResult<(String, String)> {
    let parsed = Url::parse(uri).map_err(|e| WqError::NotAUri(format!("{}: {}", uri, e)))?;
    let bucket = parsed
        .host_str()
        .ok_or_else(|| WqError::NotAUri(format!("no bucket in URI: {}", uri)))?
        .to_string();
    let key = parsed.path().trim_start_matches('/').to_string();
    Ok((bucket, key))
}
