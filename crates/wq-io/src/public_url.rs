//! Public HTTPS addresses for object-storage URIs and Last-Modified lookup.

use chrono::{DateTime, Utc};
use tracing::debug;

use wq_common::{parse_bucket_key, Backend, WqError, WqResult};

/// AWS region used when a caller does not supply one: `WQ_AWS_REGION`, then
/// `AWS_REGION`, then the platform's home region.
pub fn default_aws_region() -> String {
    std::env::var("WQ_AWS_REGION")
        .or_else(|_| std::env::var("AWS_REGION"))
        .unwrap_or_else(|_| "af-south-1".to_string())
}

/// Public HTTPS URL for a `gs://` or `gcs://` URI.
pub fn gs_public_url(uri: &str) -> WqResult<String> {
    match Backend::classify(uri)? {
        Backend::Gcs => {
            let (bucket, key) = parse_bucket_key(uri)?;
            Ok(format!("https://storage.googleapis.com/{}/{}", bucket, key))
        }
        _ => Err(WqError::NotAUri(format!("not a gsutil URI: {}", uri))),
    }
}

/// Public virtual-hosted HTTPS URL for an `s3://` URI in the given region.
pub fn s3_public_url(uri: &str, region: &str) -> WqResult<String> {
    match Backend::classify(uri)? {
        Backend::S3 => {
            let (bucket, key) = parse_bucket_key(uri)?;
            Ok(format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket, region, key
            ))
        }
        _ => Err(WqError::NotAUri(format!("not an S3 URI: {}", uri))),
    }
}

/// Public HTTPS URL for any remote URI.
///
/// GCS and S3 URIs are rewritten to their public endpoints (`region` falls
/// back to [`default_aws_region`]); HTTP URLs pass through unchanged; local
/// paths have no public URL and are rejected.
pub fn public_url(uri: &str, region: Option<&str>) -> WqResult<String> {
    match Backend::classify(uri)? {
        Backend::Gcs => gs_public_url(uri),
        Backend::S3 => {
            let region = region.map(str::to_string).unwrap_or_else(default_aws_region);
            s3_public_url(uri, &region)
        }
        Backend::Http => Ok(uri.to_string()),
        Backend::Local => Err(WqError::NotAUri(format!(
            "no public URL for local path: {}",
            uri
        ))),
    }
}

/// Last-Modified timestamp of a resource, if the server reports one.
///
/// The URI is resolved to its public URL, then HEAD-requested with redirects
/// followed. An absent header is `Ok(None)`; a malformed header, transport
/// failure, or non-success status is an error.
pub async fn last_modified(
    uri: &str,
    region: Option<&str>,
) -> WqResult<Option<DateTime<Utc>>> {
    let url = public_url(uri, region)?;
    debug!(url = %url, "resolving Last-Modified");

    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| WqError::HttpFailure(format!("HTTP client: {}", e)))?;

    let response = client
        .head(&url)
        .send()
        .await
        .map_err(|e| WqError::HttpFailure(format!("HEAD {} failed: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(WqError::HttpFailure(format!(
            "HEAD {} returned {}",
            url,
            response.status()
        )));
    }

    match response.headers().get(reqwest::header::LAST_MODIFIED) {
        None => Ok(None),
        Some(value) => {
            let text = value.to_str().map_err(|_| {
                WqError::HttpFailure(format!("unreadable Last-Modified from {}", url))
            })?;
            parse_http_date(&url, text).map(Some)
        }
    }
}

/// Parse an HTTP-date (IMF-fixdate, e.g. `Tue, 15 Nov 1994 08:12:31 GMT`)
/// into UTC.
fn parse_http_date(url: &str, text: &str) -> WqResult<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            WqError::HttpFailure(format!(
                "invalid Last-Modified {:?} from {}: {}",
                text, url, e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gs_public_url() {
        assert_eq!(
            gs_public_url("gs://deafrica-data/wq/scene.tif").unwrap(),
            "https://storage.googleapis.com/deafrica-data/wq/scene.tif"
        );
        // gcs:// is the same backend, same endpoint.
        assert_eq!(
            gs_public_url("gcs://deafrica-data/wq/scene.tif").unwrap(),
            "https://storage.googleapis.com/deafrica-data/wq/scene.tif"
        );
    }

    #[test]
    fn test_gs_public_url_rejects_other_backends() {
        assert!(matches!(
            gs_public_url("s3://bucket/key"),
            Err(WqError::NotAUri(_))
        ));
        assert!(matches!(
            gs_public_url("/local/path"),
            Err(WqError::NotAUri(_))
        ));
    }

    #[test]
    fn test_s3_public_url_is_virtual_hosted() {
        assert_eq!(
            s3_public_url("s3://deafrica-water-quality/wq/scene.tif", "af-south-1").unwrap(),
            "https://deafrica-water-quality.s3.af-south-1.amazonaws.com/wq/scene.tif"
        );
    }

    #[test]
    fn test_public_url_dispatch() {
        assert_eq!(
            public_url("https://example.com/a.tif", None).unwrap(),
            "https://example.com/a.tif"
        );
        assert_eq!(
            public_url("s3://bucket/key.tif", Some("eu-west-1")).unwrap(),
            "https://bucket.s3.eu-west-1.amazonaws.com/key.tif"
        );
        assert!(matches!(
            public_url("/local/path.tif", None),
            Err(WqError::NotAUri(_))
        ));
    }

    #[test]
    fn test_parse_http_date() {
        let parsed = parse_http_date("https://example.com", "Tue, 15 Nov 1994 08:12:31 GMT")
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(1994, 11, 15, 8, 12, 31).unwrap());

        assert!(matches!(
            parse_http_date("https://example.com", "not a date"),
            Err(WqError::HttpFailure(_))
        ));
    }
}
