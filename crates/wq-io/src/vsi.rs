//! GDAL virtual-filesystem addresses for archived and remote resources.

use wq_common::{extension, Backend, WqResult};

/// Archive driver for a path, keyed on its exact final extension.
/// Uppercase variants select no driver.
fn archive_driver(uri: &str) -> Option<&'static str> {
    match extension(uri)? {
        ".zip" => Some("vsizip"),
        ".gz" => Some("vsigzip"),
        ".tar" | ".tgz" => Some("vsitar"),
        ".7z" => Some("vsi7z"),
        ".rar" => Some("vsirar"),
        _ => None,
    }
}

/// Build the GDAL VSI address for a resource URI.
///
/// The archive driver (if the final extension names one) wraps the URI
/// first; the network driver for remote backends then wraps that result, so
/// the network layer is always outermost. The original URI is embedded
/// verbatim, scheme included. Local plain files pass through unchanged.
pub fn vsi_path(uri: &str) -> WqResult<String> {
    let backend = Backend::classify(uri)?;

    let layered = match archive_driver(uri) {
        Some(driver) => format!("/{}/{}", driver, uri),
        None => uri.to_string(),
    };

    Ok(match backend {
        Backend::Local => layered,
        Backend::Http => format!("/vsicurl/{}", layered),
        Backend::S3 => format!("/vsis3/{}", layered),
        Backend::Gcs => format!("/vsigs/{}", layered),
    })
}
