//! Google Cloud Storage filesystem handles.

use std::sync::Arc;

use object_store::gcp::GoogleCloudStorageBuilder;

use wq_common::{parse_bucket_key, Backend, WqError, WqResult};

use crate::filesystem::CredentialMode;
use crate::object::ObjectFs;

/// Build a GCS handle for the bucket named in `uri`.
///
/// Anonymous mode sends unsigned requests; authenticated mode uses
/// application-default credentials from the environment. Both `gs://` and
/// `gcs://` URIs resolve here; walked paths qualify with `gs://`.
pub(crate) fn filesystem(uri: &str, mode: CredentialMode) -> WqResult<ObjectFs> {
    let (bucket, _) = parse_bucket_key(uri)?;

    let builder = match mode {
        CredentialMode::Anonymous => GoogleCloudStorageBuilder::new().with_skip_signature(true),
        CredentialMode::Authenticated => GoogleCloudStorageBuilder::from_env(),
    };

    let store = builder
        .with_bucket_name(&bucket)
        .build()
        .map_err(|e| WqError::BackendUnavailable(format!("GCS handle for {}: {}", uri, e)))?;

    Ok(ObjectFs::new(Arc::new(store), Backend::Gcs, "gs", bucket))
}
