//! The query-engine smoke sequence: three statements on one cursor.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{Connection, TrinoError};
use crate::cursor::Cursor;
use crate::result::QueryResult;

pub const SHOW_CATALOGS: &str = "SHOW CATALOGS";
pub const SHOW_SCHEMAS_IN_HIVE: &str = "SHOW SCHEMAS IN hive";
pub const SELECT_ONE: &str = "SELECT 1";

/// Results of one successful smoke run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySmokeReport {
    pub catalogs: QueryResult,
    pub schemas: QueryResult,
    pub select_one: QueryResult,
}

impl QuerySmokeReport {
    pub fn catalog_names(&self) -> Vec<String> {
        self.catalogs.first_column_strings()
    }

    pub fn schema_names(&self) -> Vec<String> {
        self.schemas.first_column_strings()
    }
}

pub struct QuerySmoke {
    conn: Connection,
}

impl QuerySmoke {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Execute the three statements in order on a single cursor, writing
    /// each fetched row set to `out`. The cursor is closed afterwards, also
    /// when a statement fails.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<QuerySmokeReport, TrinoError> {
        let mut cursor = self.conn.cursor();
        let outcome = run_steps(&mut cursor, out).await;

        let closed = cursor.close().await;
        let report = outcome?;
        closed?;

        info!(
            catalogs = report.catalogs.row_count(),
            schemas = report.schemas.row_count(),
            "Query smoke run complete"
        );
        Ok(report)
    }
}

async fn run_steps<W: Write>(
    cursor: &mut Cursor<'_>,
    out: &mut W,
) -> Result<QuerySmokeReport, TrinoError> {
    let catalogs = run_step(cursor, SHOW_CATALOGS, "Catalogs", out).await?;
    let schemas = run_step(cursor, SHOW_SCHEMAS_IN_HIVE, "Schemas in hive", out).await?;
    let select_one = run_step(cursor, SELECT_ONE, "SELECT 1 result", out).await?;
    Ok(QuerySmokeReport { catalogs, schemas, select_one })
}

async fn run_step<W: Write>(
    cursor: &mut Cursor<'_>,
    sql: &str,
    label: &str,
    out: &mut W,
) -> Result<QueryResult, TrinoError> {
    cursor.execute(sql).await?;
    let rows = cursor.fetchall()?;
    writeln!(
        out,
        "{}: {}",
        label,
        serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
    )?;
    cursor.result().cloned().ok_or(TrinoError::NoResultSet)
}
