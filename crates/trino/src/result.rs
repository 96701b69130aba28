use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column definition returned by a Trino query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrinoColumn {
    /// Column name as declared in the result set.
    pub name: String,
    /// Trino type (e.g. "varchar(6)", "integer", "bigint", "timestamp(3)").
    pub data_type: String,
}

/// Execution metadata for a finished Trino query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Coordinator-assigned query ID.
    pub query_id: String,
    /// Final state as reported by the coordinator ("FINISHED", ...).
    pub state: String,
    /// Rows the engine processed (not the rows returned).
    pub processed_rows: u64,
    pub elapsed_time_ms: u64,
    /// Statement kind for DDL/DML ("INSERT", "CREATE TABLE", ...).
    pub update_type: Option<String>,
    pub update_count: Option<u64>,
}

/// All rows produced by one statement.
///
/// Cells keep the JSON values the coordinator sent: numbers stay numbers,
/// `null` is SQL NULL. Column ordering in each row matches `columns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<TrinoColumn>,
    pub rows: Vec<Vec<Value>>,
    pub metadata: QueryMetadata,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the zero-based index of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Retrieves the value at the given row index and column name.
    ///
    /// Returns `None` if the row index is out of bounds, the column name
    /// does not exist, or the cell value is SQL NULL.
    pub fn get_value(&self, row: usize, col: &str) -> Option<&Value> {
        let col_idx = self.column_index(col)?;
        let row_data = self.rows.get(row)?;
        row_data.get(col_idx).filter(|v| !v.is_null())
    }

    /// First column of every row as text; handy for SHOW statements.
    pub fn first_column_strings(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .map(cell_text)
            .collect()
    }

    /// Rows as a compact JSON array, e.g. `[["hive"],["system"]]`.
    pub fn rows_json(&self) -> String {
        serde_json::to_string(&self.rows).unwrap_or_else(|_| "[]".to_string())
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "(empty result set)");
        }

        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        // Compute column widths (minimum = header length).
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.name.chars().count()).collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                let cell_len = cell.chars().count();
                if i < widths.len() && cell_len > widths[i] {
                    widths[i] = cell_len;
                }
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", col.name, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                let width = widths.get(i).copied().unwrap_or(0);
                write!(f, "{:<width$}", cell, width = width)?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        write!(
            f,
            "Query {} | {} rows | {} | {}ms",
            self.metadata.query_id,
            self.rows.len(),
            self.metadata.state,
            self.metadata.elapsed_time_ms,
        )
    }
}
