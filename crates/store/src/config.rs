use serde::{Deserialize, Serialize};

use lakeprobe_core::config::{
    active_profile, profiled_env_bool, profiled_env_opt, profiled_env_or, profiled_env_u64,
};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9000";
pub const DEFAULT_ACCESS_KEY: &str = "minioadmin";
pub const DEFAULT_SECRET_KEY: &str = "minioadmin";
pub const DEFAULT_REGION: &str = "us-east-1";
/// Must already exist on the store; the smoke test never creates it.
pub const DEFAULT_BUCKET: &str = "demo-bucket";
pub const DEFAULT_OBJECT_KEY: &str = "test-folder/hello.txt";
pub const DEFAULT_PAYLOAD: &[u8] = b"Hello from MinIO!";

const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Connection and object settings for the object-store smoke test.
///
/// Defaults point at a stock local MinIO. Each field can be overridden from
/// the environment; with a profile active (`LAKEPROBE_PROFILE=CI`) the key
/// `CI_S3_BUCKET` is checked before `S3_BUCKET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// S3 API endpoint, scheme included.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Region used for SigV4 signing.
    pub region: String,
    /// Address buckets as `{endpoint}/{bucket}` instead of `{bucket}.{host}`.
    pub force_path_style: bool,
    pub bucket: String,
    pub object_key: String,
    /// Bytes uploaded and expected back.
    pub payload: Vec<u8>,
    pub connect_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_key: DEFAULT_ACCESS_KEY.to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            region: DEFAULT_REGION.to_string(),
            force_path_style: true,
            bucket: DEFAULT_BUCKET.to_string(),
            object_key: DEFAULT_OBJECT_KEY.to_string(),
            payload: DEFAULT_PAYLOAD.to_vec(),
            connect_timeout_seconds: DEFAULT_CONNECT_TIMEOUT_SECONDS,
        }
    }
}

impl StoreConfig {
    /// Build config from environment variables using the active profile.
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    /// Build config for a specific named profile.
    ///
    /// `S3_REGION` falls back to `AWS_REGION` before using the default.
    pub fn from_env_profiled(profile: &str) -> Self {
        let defaults = Self::default();
        let region = profiled_env_opt(profile, "S3_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION"))
            .unwrap_or(defaults.region);
        let payload = profiled_env_opt(profile, "S3_PAYLOAD")
            .map(String::into_bytes)
            .unwrap_or(defaults.payload);

        Self {
            endpoint: profiled_env_or(profile, "S3_ENDPOINT", &defaults.endpoint),
            access_key: profiled_env_or(profile, "S3_ACCESS_KEY", &defaults.access_key),
            secret_key: profiled_env_or(profile, "S3_SECRET_KEY", &defaults.secret_key),
            region,
            force_path_style: profiled_env_bool(
                profile,
                "S3_FORCE_PATH_STYLE",
                defaults.force_path_style,
            ),
            bucket: profiled_env_or(profile, "S3_BUCKET", &defaults.bucket),
            object_key: profiled_env_or(profile, "S3_OBJECT_KEY", &defaults.object_key),
            payload,
            connect_timeout_seconds: profiled_env_u64(
                profile,
                "S3_CONNECT_TIMEOUT_SECONDS",
                defaults.connect_timeout_seconds,
            ),
        }
    }

    /// Secret key with all but the first two characters masked, for logs.
    pub fn redacted_secret(&self) -> String {
        let visible: String = self.secret_key.chars().take(2).collect();
        format!("{}***", visible)
    }
}
