//! Statement execution and row fetching.

use serde_json::Value;
use tracing::{debug, error, info};

use crate::client::{Connection, TrinoError};
use crate::protocol::QueryResults;
use crate::result::{QueryMetadata, QueryResult, TrinoColumn};

pub type Row = Vec<Value>;

/// Executes statements on a [`Connection`] and hands out their rows.
///
/// `execute` drives the query to completion, so any engine-side failure is
/// reported there and never from a fetch. Fetches consume the buffered rows
/// in order.
pub struct Cursor<'c> {
    conn: &'c Connection,
    result: Option<QueryResult>,
    position: usize,
    /// `nextUri` of a query that has not finished yet.
    in_flight: Option<String>,
    closed: bool,
}

impl<'c> Cursor<'c> {
    pub(crate) fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            result: None,
            position: 0,
            in_flight: None,
            closed: false,
        }
    }

    /// Run `sql` and buffer its full result set.
    pub async fn execute(&mut self, sql: &str) -> Result<(), TrinoError> {
        self.ensure_open()?;
        // A query abandoned by a failed execute is still running server-side.
        self.cancel().await?;
        self.result = None;
        self.position = 0;

        info!(sql = %sql, "Executing statement");

        let mut page = self.conn.submit(sql).await?;
        let query_id = page.id.clone();
        let mut columns: Option<Vec<TrinoColumn>> = None;
        let mut rows: Vec<Row> = Vec::new();

        loop {
            if let Some(err) = page.error.take() {
                self.in_flight = None;
                let error_name = err.error_name.unwrap_or_else(|| "UNKNOWN".to_string());
                error!(
                    query_id = %query_id,
                    error_name = %error_name,
                    message = %err.message,
                    "Query failed"
                );
                return Err(TrinoError::QueryFailed {
                    query_id,
                    error_name,
                    message: err.message,
                });
            }

            if columns.is_none() {
                columns = page.columns.take().map(|cols| {
                    cols.into_iter()
                        .map(|c| TrinoColumn { name: c.name, data_type: c.data_type })
                        .collect()
                });
            }
            if let Some(data) = page.data.take() {
                rows.extend(data);
            }

            debug!(
                query_id = %query_id,
                state = %page.stats.state,
                rows = rows.len(),
                "Polled query page"
            );

            match page.next_uri.take() {
                Some(next) => {
                    self.in_flight = Some(next.clone());
                    let following = self.conn.advance(&next).await?;
                    if following.id != query_id {
                        return Err(TrinoError::Protocol(format!(
                            "page for query {} while following {}",
                            following.id, query_id
                        )));
                    }
                    page = following;
                }
                None => break,
            }
        }
        self.in_flight = None;

        let result = QueryResult {
            columns: columns.unwrap_or_default(),
            rows,
            metadata: finished_metadata(&query_id, &page),
        };

        info!(
            query_id = %query_id,
            rows = result.row_count(),
            state = %result.metadata.state,
            "Statement finished"
        );

        self.result = Some(result);
        Ok(())
    }

    /// Next unread row, or `None` once all rows were fetched.
    pub fn fetchone(&mut self) -> Result<Option<Row>, TrinoError> {
        let result = self.current()?;
        let row = result.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    /// Up to `size` unread rows.
    pub fn fetchmany(&mut self, size: usize) -> Result<Vec<Row>, TrinoError> {
        let result = self.current()?;
        let end = self.position.saturating_add(size).min(result.rows.len());
        let rows = result.rows[self.position..end].to_vec();
        self.position = end;
        Ok(rows)
    }

    /// All unread rows.
    pub fn fetchall(&mut self) -> Result<Vec<Row>, TrinoError> {
        let result = self.current()?;
        let rows = result.rows[self.position..].to_vec();
        self.position += rows.len();
        Ok(rows)
    }

    /// Columns of the last executed statement.
    pub fn description(&self) -> Option<&[TrinoColumn]> {
        self.result.as_ref().map(|r| r.columns.as_slice())
    }

    /// Rows affected by the last DML statement, when the engine reports it.
    pub fn rowcount(&self) -> Option<u64> {
        self.result.as_ref().and_then(|r| r.metadata.update_count)
    }

    pub fn query_id(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.metadata.query_id.as_str())
    }

    /// The full result of the last executed statement.
    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    /// Cancel the in-flight query, if any.
    pub async fn cancel(&mut self) -> Result<(), TrinoError> {
        if let Some(next) = self.in_flight.take() {
            info!(next_uri = %next, "Cancelling query");
            self.conn.cancel(&next).await?;
        }
        Ok(())
    }

    /// Cancel anything in flight and refuse further use.
    pub async fn close(&mut self) -> Result<(), TrinoError> {
        if self.closed {
            return Ok(());
        }
        let cancelled = self.cancel().await;
        self.closed = true;
        self.result = None;
        cancelled
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), TrinoError> {
        if self.closed {
            Err(TrinoError::Closed)
        } else {
            Ok(())
        }
    }

    fn current(&self) -> Result<&QueryResult, TrinoError> {
        self.ensure_open()?;
        self.result.as_ref().ok_or(TrinoError::NoResultSet)
    }
}

fn finished_metadata(query_id: &str, last: &QueryResults) -> QueryMetadata {
    QueryMetadata {
        query_id: query_id.to_string(),
        state: last.stats.state.clone(),
        processed_rows: last.stats.processed_rows,
        elapsed_time_ms: last.stats.elapsed_time_millis,
        update_type: last.update_type.clone(),
        update_count: last.update_count,
    }
}
