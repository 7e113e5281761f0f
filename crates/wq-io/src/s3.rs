//! Amazon S3 filesystem handles.

use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::ClientOptions;
use reqwest::header::{HeaderMap, HeaderValue};

use wq_common::{parse_bucket_key, Backend, WqError, WqResult};

use crate::filesystem::CredentialMode;
use crate::object::ObjectFs;
use crate::public_url::default_aws_region;

/// Canned ACL attached to every authenticated request so objects written
/// into buckets owned by other accounts stay readable by the bucket owner.
fn acl_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-amz-acl",
        HeaderValue::from_static("bucket-owner-full-control"),
    );
    headers
}

/// Build an S3 handle for the bucket named in `uri`.
///
/// Anonymous mode sends unsigned requests; authenticated mode uses the
/// ambient AWS environment credentials. The region comes from
/// [`default_aws_region`].
pub(crate) fn filesystem(uri: &str, mode: CredentialMode) -> WqResult<ObjectFs> {
    let (bucket, _) = parse_bucket_key(uri)?;

    let builder = match mode {
        CredentialMode::Anonymous => AmazonS3Builder::new().with_skip_signature(true),
        CredentialMode::Authenticated => AmazonS3Builder::from_env()
            .with_client_options(ClientOptions::new().with_default_headers(acl_headers())),
    };

    let store = builder
        .with_bucket_name(&bucket)
        .with_region(default_aws_region())
        .build()
        .map_err(|e| WqError::BackendUnavailable(format!("S3 handle for {}: {}", uri, e)))?;

    Ok(ObjectFs::new(Arc::new(store), Backend::S3, "s3", bucket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::FileSystem;

    #[test]
    fn test_anonymous_handle_builds_without_credentials() {
        let fs = filesystem("s3://deafrica-water-quality/wq", CredentialMode::Anonymous).unwrap();
        assert_eq!(fs.backend(), Backend::S3);
        assert_eq!(
            fs.qualify("deafrica-water-quality/wq/scene.tif"),
            "s3://deafrica-water-quality/wq/scene.tif"
        );
    }

    #[test]
    fn test_bucketless_uri_is_rejected() {
        assert!(matches!(
            filesystem("not a uri", CredentialMode::Anonymous),
            Err(WqError::NotAUri(_))
        ));
    }
}
