//! S3-compatible object store client.
//!
//! Provides [`StoreClient`], a thin wrapper over the AWS SDK S3 client that is
//! configured entirely from a [`StoreConfig`] (static credentials, explicit
//! region and endpoint) rather than the ambient AWS credential chain.

use std::fmt;
use std::time::Duration;

use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{
    BehaviorVersion, Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info};

use crate::config::StoreConfig;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// The S3 call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    ListBuckets,
    PutObject,
    GetObject,
    ListObjects,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::ListBuckets => "ListBuckets",
            StoreOp::PutObject => "PutObject",
            StoreOp::GetObject => "GetObject",
            StoreOp::ListObjects => "ListObjectsV2",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during object-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never got a response: connection refused, DNS failure,
    /// or a connect/read timeout.
    #[error("{op} failed: object store unreachable at {endpoint}: {message}")]
    Unreachable {
        op: StoreOp,
        endpoint: String,
        message: String,
    },

    /// The store answered with an error (auth, missing bucket, ...).
    #[error("{op} failed: {message}")]
    Sdk { op: StoreOp, message: String },

    /// A downloaded body that should have been text was not UTF-8.
    #[error("object {key} is not valid UTF-8")]
    InvalidUtf8 { key: String },

    /// Writing smoke output failed.
    #[error("failed to write smoke output: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// The S3 call that failed, if the error came from one.
    pub fn op(&self) -> Option<StoreOp> {
        match self {
            StoreError::Unreachable { op, .. } | StoreError::Sdk { op, .. } => Some(*op),
            StoreError::InvalidUtf8 { .. } => Some(StoreOp::GetObject),
            StoreError::Io(_) => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, StoreError::Unreachable { .. })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for a single S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct StoreClient {
    config: StoreConfig,
    s3: aws_sdk_s3::Client,
}

impl StoreClient {
    /// Build a client from the given configuration.
    ///
    /// Retries are disabled so that the first failure is the one reported.
    /// Checksums are only sent where the S3 API requires them.
    /// No network traffic happens here.
    pub fn new(config: StoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None, // session token
            None, // expiry
            "lakeprobe-static",
        );

        let timeouts = TimeoutConfig::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build();

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .force_path_style(config.force_path_style)
            .retry_config(RetryConfig::disabled())
            // Older MinIO releases reject the SDK's default CRC32 trailers.
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .timeout_config(timeouts)
            .build();

        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            access_key = %config.access_key,
            secret_key = %config.redacted_secret(),
            path_style = config.force_path_style,
            "StoreClient initialised"
        );

        Self {
            config,
            s3: aws_sdk_s3::Client::from_conf(s3_config),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Names of all buckets visible to the configured credentials.
    pub async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        let resp = self
            .s3
            .list_buckets()
            .send()
            .await
            .map_err(|e| self.sdk_error(StoreOp::ListBuckets, e))?;

        let names: Vec<String> = resp
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect();

        debug!(count = names.len(), "Listed buckets");
        Ok(names)
    }

    /// Upload `body` to `bucket/key`, replacing any existing object.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), StoreError> {
        let size = body.len();
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| self.sdk_error(StoreOp::PutObject, e))?;

        info!(bucket = %bucket, key = %key, size, "Uploaded object");
        Ok(())
    }

    /// Download the full body of `bucket/key`.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let resp = self
            .s3
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.sdk_error(StoreOp::GetObject, e))?;

        let data = resp.body.collect().await.map_err(|e| StoreError::Sdk {
            op: StoreOp::GetObject,
            message: format!("failed to read body: {}", DisplayErrorContext(&e)),
        })?;
        let bytes = data.into_bytes().to_vec();

        info!(bucket = %bucket, key = %key, size = bytes.len(), "Downloaded object");
        Ok(bytes)
    }

    /// Download `bucket/key` and decode it as UTF-8.
    pub async fn get_object_string(&self, bucket: &str, key: &str) -> Result<String, StoreError> {
        let bytes = self.get_object(bucket, key).await?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8 {
            key: key.to_string(),
        })
    }

    /// Keys in `bucket` from a single `ListObjectsV2` page (up to 1000).
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError> {
        let resp = self
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| self.sdk_error(StoreOp::ListObjects, e))?;

        let keys: Vec<String> = resp
            .contents()
            .iter()
            .filter_map(|o| o.key().map(str::to_string))
            .collect();

        debug!(
            bucket = %bucket,
            count = keys.len(),
            truncated = resp.is_truncated().unwrap_or(false),
            "Listed objects"
        );
        Ok(keys)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Split SDK failures into "no response" and "store said no".
    fn sdk_error<E, R>(&self, op: StoreOp, err: SdkError<E, R>) -> StoreError
    where
        E: std::error::Error + 'static,
        R: fmt::Debug + 'static,
    {
        let message = DisplayErrorContext(&err).to_string();
        match err {
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StoreError::Unreachable {
                op,
                endpoint: self.config.endpoint.clone(),
                message,
            },
            _ => StoreError::Sdk { op, message },
        }
    }
}
