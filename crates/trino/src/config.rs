use serde::{Deserialize, Serialize};

use lakeprobe_core::config::{active_profile, profiled_env_or, profiled_env_u16, profiled_env_u64};

use crate::protocol::STATEMENT_PATH;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_USER: &str = "admin";
const DEFAULT_CATALOG: &str = "hive";
const DEFAULT_SCHEMA: &str = "default";
const DEFAULT_SOURCE: &str = "lakeprobe";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for a Trino coordinator.
///
/// Reads from environment variables with optional profile prefix.
/// When `LAKEPROBE_PROFILE=CI`, checks `CI_TRINO_HOST` before `TRINO_HOST`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrinoConfig {
    /// `http` or `https`.
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Sent as `X-Trino-User`. Without authentication any name is accepted.
    pub user: String,
    pub catalog: String,
    pub schema: String,
    /// Sent as `X-Trino-Source`; shows up in the coordinator's query list.
    pub source: String,
    /// Per-request timeout, also the budget for "server busy" re-polls.
    pub request_timeout_seconds: u64,
}

impl Default for TrinoConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            catalog: DEFAULT_CATALOG.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl TrinoConfig {
    /// Build config from environment variables using the active profile.
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        Self {
            scheme: profiled_env_or(profile, "TRINO_HTTP_SCHEME", DEFAULT_SCHEME),
            host: profiled_env_or(profile, "TRINO_HOST", DEFAULT_HOST),
            port: profiled_env_u16(profile, "TRINO_PORT", DEFAULT_PORT),
            user: profiled_env_or(profile, "TRINO_USER", DEFAULT_USER),
            catalog: profiled_env_or(profile, "TRINO_CATALOG", DEFAULT_CATALOG),
            schema: profiled_env_or(profile, "TRINO_SCHEMA", DEFAULT_SCHEMA),
            source: profiled_env_or(profile, "TRINO_SOURCE", DEFAULT_SOURCE),
            request_timeout_seconds: profiled_env_u64(
                profile,
                "TRINO_REQUEST_TIMEOUT_SECONDS",
                DEFAULT_REQUEST_TIMEOUT_SECONDS,
            ),
        }
    }

    /// `{scheme}://{host}:{port}`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Where new statements are submitted.
    pub fn statement_url(&self) -> String {
        format!("{}{}", self.base_url(), STATEMENT_PATH)
    }
}
