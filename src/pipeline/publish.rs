//! Artifact publishing: one atomic put into date-partitioned object storage.
//!
//! The publisher checks its preconditions (non-empty payload, configured
//! bucket) before touching the network, probes the destination for
//! reachability, then performs a single `PutObject` tagged with the
//! spreadsheet content type and server-side encryption. Each failure in that
//! sequence is a distinct [`PipelineError`] variant so callers can report
//! the exact cause.
//!
//! There is no idempotency by design: re-publishing the same artifact under
//! a different filename produces a new, independent key. Same-day publishes
//! share the date prefix and differ only by filename.

use crate::error::PipelineError;
use crate::pipeline::export::SPREADSHEET_CONTENT_TYPE;
use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Acknowledgement of a completed write.
#[derive(Debug, Clone, Default)]
pub struct PutReceipt {
    /// Entity tag the store assigned, when reported.
    pub etag: Option<String>,
}

/// Durable object storage for published artifacts.
///
/// The default implementation is [`S3Store`]; tests substitute mocks.
///
/// Implementations that can observe a non-success status without a transport
/// fault must return [`PipelineError::UnexpectedPublishResponse`] from
/// [`ObjectStore::put`] — success is an explicit acknowledgement, not merely
/// the absence of an error.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lightweight reachability check of the destination bucket.
    async fn probe(&self, bucket: &str) -> Result<(), PipelineError>;

    /// Atomically write the full payload under `key`.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<PutReceipt, PipelineError>;
}

/// Derive the storage key for an artifact published on `date`.
pub fn storage_key(prefix: &str, date: NaiveDate, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        prefix.trim_end_matches('/'),
        date.format("%Y/%m/%d"),
        filename
    )
}

/// Publish artifact bytes to the destination bucket.
///
/// Precondition failures ([`PipelineError::EmptyArtifact`],
/// [`PipelineError::DestinationNotConfigured`]) are returned before any
/// network call. The publish date is captured once at call time.
pub async fn publish(
    store: &dyn ObjectStore,
    data: &[u8],
    filename: &str,
    bucket: &str,
    prefix: &str,
) -> Result<String, PipelineError> {
    if data.is_empty() {
        return Err(PipelineError::EmptyArtifact);
    }
    if bucket.trim().is_empty() {
        return Err(PipelineError::DestinationNotConfigured);
    }

    let key = storage_key(prefix, Local::now().date_naive(), filename);
    info!(bucket, key, bytes = data.len(), "publishing artifact");

    store.probe(bucket).await?;
    debug!(bucket, "destination is reachable");

    let receipt = store
        .put(bucket, &key, data.to_vec(), SPREADSHEET_CONTENT_TYPE)
        .await?;
    info!(
        bucket,
        key,
        etag = receipt.etag.as_deref().unwrap_or("-"),
        "artifact published"
    );
    Ok(key)
}

// ── S3 implementation ────────────────────────────────────────────────────

/// [`ObjectStore`] backed by S3.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Build a store for `region` using the default credential chain.
    pub async fn from_region(region: &str) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_s3::Client::new(&shared),
        }
    }

    /// Wrap an already-configured client (custom endpoint, credentials).
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn probe(&self, bucket: &str) -> Result<(), PipelineError> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| PipelineError::DestinationUnreachable {
                bucket: bucket.to_string(),
                detail: error_detail(&e),
            })?;
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<PutReceipt, PipelineError> {
        let response = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .server_side_encryption(ServerSideEncryption::Aes256)
            .send()
            .await
            .map_err(|e| match e.code() {
                Some("NoSuchBucket") => PipelineError::BucketNotFound {
                    bucket: bucket.to_string(),
                },
                Some(code @ ("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch")) => {
                    PipelineError::PublishPermission {
                        code: code.to_string(),
                        message: e.message().unwrap_or("access denied").to_string(),
                    }
                }
                _ => PipelineError::PublishTransport {
                    detail: error_detail(&e),
                },
            })?;

        Ok(PutReceipt {
            etag: response.e_tag().map(str::to_string),
        })
    }
}

/// Vendor error code and message when available, otherwise the display form.
fn error_detail<E>(e: &E) -> String
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    match (e.code(), e.message()) {
        (Some(code), Some(message)) => format!("[{code}] {message}"),
        (Some(code), None) => format!("[{code}]"),
        _ => e.to_string(),
    }
}
