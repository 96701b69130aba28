//! Wire types for the Trino client REST protocol.
//!
//! A statement is submitted with `POST /v1/statement`; every response is a
//! `QueryResults` document. While `nextUri` is present the query is still
//! producing pages and the client must `GET` it; `DELETE` on it cancels.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATEMENT_PATH: &str = "/v1/statement";

pub const HEADER_USER: &str = "X-Trino-User";
pub const HEADER_CATALOG: &str = "X-Trino-Catalog";
pub const HEADER_SCHEMA: &str = "X-Trino-Schema";
pub const HEADER_SOURCE: &str = "X-Trino-Source";

/// One page of a running or finished query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub id: String,
    #[serde(default)]
    pub info_uri: Option<String>,
    #[serde(default)]
    pub next_uri: Option<String>,
    /// Sent once, on the first page that carries data (or the last page).
    #[serde(default)]
    pub columns: Option<Vec<WireColumn>>,
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub stats: StatementStats,
    #[serde(default)]
    pub error: Option<QueryError>,
    #[serde(default)]
    pub update_type: Option<String>,
    #[serde(default)]
    pub update_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementStats {
    /// QUEUED, PLANNING, STARTING, RUNNING, FINISHING, FINISHED or FAILED.
    pub state: String,
    #[serde(default)]
    pub processed_rows: u64,
    #[serde(default)]
    pub processed_bytes: u64,
    #[serde(default)]
    pub elapsed_time_millis: u64,
}

impl Default for StatementStats {
    fn default() -> Self {
        Self {
            state: "UNKNOWN".to_string(),
            processed_rows: 0,
            processed_bytes: 0,
            elapsed_time_millis: 0,
        }
    }
}

/// Engine-side failure attached to a `QueryResults` page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}
