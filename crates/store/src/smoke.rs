//! The object-store smoke sequence: list buckets, upload, download, list.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{StoreClient, StoreError};

/// What one successful smoke run observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSmokeReport {
    pub buckets: Vec<String>,
    pub bucket: String,
    pub uploaded_key: String,
    pub downloaded: String,
    pub objects: Vec<String>,
}

impl StoreSmokeReport {
    /// The downloaded content equals what was uploaded.
    pub fn round_trip_ok(&self, payload: &[u8]) -> bool {
        self.downloaded.as_bytes() == payload
    }

    /// The uploaded key shows up in the bucket listing.
    pub fn listed_uploaded_key(&self) -> bool {
        self.objects.iter().any(|k| k == &self.uploaded_key)
    }
}

/// Runs the four-step sequence against one bucket.
pub struct StoreSmoke {
    client: StoreClient,
}

impl StoreSmoke {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Execute the sequence, writing each step's result to `out` as soon as
    /// it completes. Stops at the first failing step.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<StoreSmokeReport, StoreError> {
        let cfg = self.client.config();
        let bucket = cfg.bucket.as_str();
        let key = cfg.object_key.as_str();

        // 1. List buckets
        let buckets = self.client.list_buckets().await?;
        writeln!(out, "Buckets: {:?}", buckets)?;

        // 2. Upload
        self.client.put_object(bucket, key, cfg.payload.clone()).await?;
        writeln!(out, "Uploaded '{}' to bucket '{}'.", key, bucket)?;

        // 3. Download
        let downloaded = self.client.get_object_string(bucket, key).await?;
        writeln!(out, "File content: {}", downloaded)?;

        // 4. List objects
        let objects = self.client.list_objects(bucket).await?;
        if !objects.is_empty() {
            writeln!(out, "Objects in bucket:")?;
            for k in &objects {
                writeln!(out, " - {}", k)?;
            }
        }

        info!(
            bucket = %bucket,
            buckets = buckets.len(),
            objects = objects.len(),
            "Store smoke run complete"
        );

        Ok(StoreSmokeReport {
            buckets,
            bucket: bucket.to_string(),
            uploaded_key: key.to_string(),
            downloaded,
            objects,
        })
    }
}
