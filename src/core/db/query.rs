/// Query Execution Module
///
/// Runs SQL through the facade's connection and materializes results:
/// scalar values, field names, associative or positional rows and
/// key/value maps. Results are read into memory eagerly.

use crate::core::db::Database;
use crate::core::{FacadeError, Result};
use crate::value::Value;
use indexmap::IndexMap;
use rusqlite::{Batch, Connection, Params, Statement};
use serde::Serialize;
use tracing::{debug, error};

/// A fully materialized result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    /// Rows changed by a statement without result columns
    affected_rows: u64,
    last_insert_id: i64,
    released: bool,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        QueryResult {
            columns,
            rows,
            ..Default::default()
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row data; empty once the result has been released.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Drops the row data. Column names stay readable.
    pub fn free(&mut self) {
        self.rows = Vec::new();
        self.released = true;
    }

    /// Fails with `ResultReleased` if the rows are gone.
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.released {
            Err(FacadeError::ResultReleased)
        } else {
            Ok(())
        }
    }
}

/// A materialized row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    /// Column name to value, in column order
    Assoc(IndexMap<String, Value>),
    /// Values by position
    List(Vec<Value>),
}

impl Row {
    /// Looks up a value by column name (associative rows only).
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self {
            Row::Assoc(map) => map.get(column),
            Row::List(_) => None,
        }
    }

    /// Looks up a value by position; works for both shapes.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Assoc(map) => map.get_index(index).map(|(_, v)| v),
            Row::List(values) => values.get(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Assoc(map) => map.len(),
            Row::List(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Database {
    /// Executes one SQL statement and returns its materialized result.
    ///
    /// Statements after the first one in `sql` are executed as well and
    /// their results discarded, leaving the connection ready for the next
    /// call. Statements run one by one in autocommit mode: if a later one
    /// fails, the effects of those before it stay committed and only the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// `FacadeError::Query` when the driver reports a failure; the code and
    /// message are logged before returning. Connection errors from the lazy
    /// connect are passed through unchanged.
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        let mut results = self.run_logged(sql)?;
        if results.is_empty() {
            return Err(log_query_error(FacadeError::Query {
                code: 0,
                message: "Query was empty".to_string(),
            }));
        }
        if results.len() > 1 {
            debug!("drained {} trailing result set(s)", results.len() - 1);
        }
        Ok(results.swap_remove(0))
    }

    /// Executes every statement in `sql` and returns one result per statement.
    pub fn execute_multi(&mut self, sql: &str) -> Result<Vec<QueryResult>> {
        self.run_logged(sql)
    }

    /// Value of the first column of the first row of `sql`, if any.
    pub fn scalar_sql(&mut self, sql: &str) -> Result<Option<Value>> {
        let mut result = self.execute(sql)?;
        scalar(&mut result)
    }

    /// All rows of `sql`, associative or positional.
    pub fn rows_sql(&mut self, sql: &str, assoc: bool) -> Result<Vec<Row>> {
        let mut result = self.execute(sql)?;
        to_rows(&mut result, assoc, true)
    }

    /// Maps the first column of a two-column query onto the second.
    ///
    /// Keys are the string form of the first column, so integer keys come
    /// back as strings (`1` becomes `"1"`). A repeated key keeps its first
    /// position and takes the last value seen.
    ///
    /// # Example
    ///
    /// `SELECT id, value FROM spr ORDER BY id` yields `{"1": "a", "2": "b"}`.
    pub fn to_key_value_map(&mut self, sql: &str) -> Result<IndexMap<String, Value>> {
        let mut result = self.execute(sql)?;
        if result.columns.len() < 2 {
            return Err(FacadeError::Shape(format!(
                "key/value map needs two columns, query returned {}",
                result.columns.len()
            )));
        }

        let mut map = IndexMap::with_capacity(result.rows.len());
        for mut row in std::mem::take(&mut result.rows) {
            let value = std::mem::replace(&mut row[1], Value::Null);
            map.insert(row[0].to_string(), value);
        }
        result.free();
        Ok(map)
    }

    fn run_logged(&mut self, sql: &str) -> Result<Vec<QueryResult>> {
        let conn = self.connect()?;
        run_batch(conn, sql).map_err(|e| log_query_error(FacadeError::from_driver(&e)))
    }
}

/// Logs a statement failure the same way for every entry point.
pub(crate) fn log_query_error(err: FacadeError) -> FacadeError {
    if let FacadeError::Query { code, message } = &err {
        error!("Query Error ({code}) {message}");
    }
    err
}

/// Executes each statement in `sql` in order, materializing every result.
fn run_batch(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<QueryResult>> {
    let mut batch = Batch::new(conn, sql);
    let mut results = Vec::new();
    while let Some(mut stmt) = batch.next()? {
        results.push(read_statement(conn, &mut stmt, [])?);
    }
    Ok(results)
}

/// Runs a prepared statement with `params` and reads every row.
pub(crate) fn read_statement<P: Params>(
    conn: &Connection,
    stmt: &mut Statement<'_>,
    params: P,
) -> rusqlite::Result<QueryResult> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query(params)?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(Value::from(row.get_ref(i)?));
        }
        rows.push(values);
    }
    drop(cursor);

    let affected_rows = if column_count == 0 {
        conn.changes() as u64
    } else {
        0
    };

    Ok(QueryResult {
        columns,
        rows,
        affected_rows,
        last_insert_id: conn.last_insert_rowid(),
        released: false,
    })
}

/// First column of the first row, or `None` for an empty result.
///
/// The result is released afterwards.
pub fn scalar(result: &mut QueryResult) -> Result<Option<Value>> {
    result.ensure_live()?;
    let value = result
        .rows
        .first_mut()
        .and_then(|row| row.first_mut())
        .map(|v| std::mem::replace(v, Value::Null));
    result.free();
    Ok(value)
}

/// Column names in result order.
pub fn field_names(result: &QueryResult) -> Vec<String> {
    result.columns.clone()
}

/// Reads every row, by column name when `assoc` is set and by position
/// otherwise. With `free` unset the result stays readable for another pass.
pub fn to_rows(result: &mut QueryResult, assoc: bool, free: bool) -> Result<Vec<Row>> {
    result.ensure_live()?;

    let rows = result
        .rows
        .iter()
        .map(|values| {
            if assoc {
                Row::Assoc(
                    result
                        .columns
                        .iter()
                        .cloned()
                        .zip(values.iter().cloned())
                        .collect(),
                )
            } else {
                Row::List(values.clone())
            }
        })
        .collect();

    if free {
        result.free();
    }
    Ok(rows)
}
