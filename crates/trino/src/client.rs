//! Trino coordinator connection.
//!
//! Provides [`Connection`], which owns the HTTP client and session settings,
//! and hands out [`Cursor`]s that run statements over the REST protocol.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::config::TrinoConfig;
use crate::cursor::Cursor;
use crate::protocol::{
    QueryResults, HEADER_CATALOG, HEADER_SCHEMA, HEADER_SOURCE, HEADER_USER,
};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to Trino.
#[derive(Debug, thiserror::Error)]
pub enum TrinoError {
    /// Transport failure: connection refused, DNS, TLS, read timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The coordinator answered with a non-success status.
    #[error("Trino returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The statement failed on the engine side.
    #[error("Query {query_id} failed: {error_name}: {message}")]
    QueryFailed {
        query_id: String,
        error_name: String,
        message: String,
    },

    /// The coordinator stayed busy (502/503/504) for the whole timeout.
    #[error("Trino stayed unavailable for {seconds}s")]
    Timeout { seconds: u64 },

    /// A response did not match the protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Fetch called before any statement was executed.
    #[error("No result set: execute a statement first")]
    NoResultSet,

    /// The cursor was closed.
    #[error("Cursor is closed")]
    Closed,

    /// Writing smoke output failed.
    #[error("failed to write smoke output: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A logical connection to one coordinator.
///
/// Like a DB-API connection this is lazy: nothing is sent until a cursor
/// executes a statement.
#[derive(Debug, Clone)]
pub struct Connection {
    config: TrinoConfig,
    http: reqwest::Client,
}

impl Connection {
    pub fn connect(config: TrinoConfig) -> Result<Self, TrinoError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("lakeprobe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            url = %config.base_url(),
            user = %config.user,
            catalog = %config.catalog,
            schema = %config.schema,
            "Trino connection configured"
        );

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &TrinoConfig {
        &self.config
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    // -----------------------------------------------------------------------
    // Protocol calls (used by Cursor)
    // -----------------------------------------------------------------------

    /// `POST /v1/statement` with the SQL as the body.
    pub(crate) async fn submit(&self, sql: &str) -> Result<QueryResults, TrinoError> {
        let url = self.config.statement_url();
        debug!(url = %url, sql = %sql, "Submitting statement");

        self.send_with_retry(|| {
            self.http
                .post(&url)
                .header(HEADER_USER, &self.config.user)
                .header(HEADER_CATALOG, &self.config.catalog)
                .header(HEADER_SCHEMA, &self.config.schema)
                .header(HEADER_SOURCE, &self.config.source)
                .body(sql.to_string())
        })
        .await
    }

    /// `GET nextUri` for the following page.
    pub(crate) async fn advance(&self, next_uri: &str) -> Result<QueryResults, TrinoError> {
        self.send_with_retry(|| {
            self.http
                .get(next_uri)
                .header(HEADER_USER, &self.config.user)
        })
        .await
    }

    /// `DELETE nextUri` to cancel an in-flight query.
    pub(crate) async fn cancel(&self, next_uri: &str) -> Result<(), TrinoError> {
        let resp = self
            .http
            .delete(next_uri)
            .header(HEADER_USER, &self.config.user)
            .send()
            .await?;

        let status = resp.status();
        // 404/410: the query already finished or expired.
        if status.is_success() || status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(TrinoError::Status {
            status: status.as_u16(),
            body,
        })
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Send a request, re-polling with exponential backoff while the
    /// coordinator answers 502/503/504, until the request timeout elapses.
    async fn send_with_retry<F>(&self, build: F) -> Result<QueryResults, TrinoError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let start = Instant::now();
        let timeout = Duration::from_secs(self.config.request_timeout_seconds);

        let initial_delay_ms: u64 = 100;
        let max_delay_ms: u64 = 2000;
        let backoff_factor: f64 = 1.5;

        let mut delay_ms = initial_delay_ms;

        loop {
            let resp = build().send().await?;
            let status = resp.status();

            if is_busy(status) {
                if start.elapsed() > timeout {
                    return Err(TrinoError::Timeout {
                        seconds: self.config.request_timeout_seconds,
                    });
                }
                warn!(status = status.as_u16(), delay_ms, "Trino busy, retrying");

                let jitter_ms = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .subsec_nanos()
                    % 100;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter_ms as u64)).await;
                delay_ms = ((delay_ms as f64 * backoff_factor) as u64).min(max_delay_ms);
                continue;
            }

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(TrinoError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = resp.bytes().await?;
            return serde_json::from_slice::<QueryResults>(&body)
                .map_err(|e| TrinoError::Protocol(format!("invalid QueryResults: {}", e)));
        }
    }
}

fn is_busy(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}
