/// Prepared Statement Module
///
/// Prepare, bind positionally, execute once, finalize. Parameters are
/// coerced to the type named by their hint before binding; without hints
/// every parameter binds as text.

use crate::core::db::query::{log_query_error, read_statement, QueryResult};
use crate::core::db::Database;
use crate::core::{FacadeError, Result};
use crate::value::Value;
use rusqlite::{params_from_iter, Batch};
use rusqlite::types::Value as SqlValue;
use std::str::FromStr;
use tracing::debug;

/// Bind type for one positional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    Float,
    Text,
    Blob,
}

impl ParamType {
    /// Parses a one-letter hint: `i`, `d`, `s` or `b`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'i' => Some(ParamType::Integer),
            'd' => Some(ParamType::Float),
            's' => Some(ParamType::Text),
            'b' => Some(ParamType::Blob),
            _ => None,
        }
    }

    /// Coerces `value` to this type. NULL stays NULL for every type.
    pub fn coerce(self, value: &Value) -> Result<SqlValue> {
        let coerced = match (self, value) {
            (_, Value::Null) => value.to_sql(),

            (ParamType::Integer, Value::Integer(_) | Value::Bool(_)) => value.to_sql(),
            (ParamType::Integer, Value::Float(f)) => SqlValue::Integer(float_to_i64(*f)?),
            (ParamType::Integer, Value::Text(s)) => SqlValue::Integer(
                s.trim()
                    .parse()
                    .map_err(|_| FacadeError::Param(format!("'{s}' is not an integer")))?,
            ),

            (ParamType::Float, Value::Float(_)) => value.to_sql(),
            (ParamType::Float, Value::Integer(i)) => SqlValue::Real(*i as f64),
            (ParamType::Float, Value::Bool(b)) => SqlValue::Real(f64::from(u8::from(*b))),
            (ParamType::Float, Value::Text(s)) => SqlValue::Real(
                s.trim()
                    .parse()
                    .map_err(|_| FacadeError::Param(format!("'{s}' is not a number")))?,
            ),

            (ParamType::Text, other) => SqlValue::Text(other.to_string()),

            (ParamType::Blob, Value::Blob(_)) => value.to_sql(),
            (ParamType::Blob, other) => SqlValue::Blob(other.to_string().into_bytes()),

            (ParamType::Integer | ParamType::Float, Value::Blob(_)) => {
                return Err(FacadeError::Param(format!(
                    "cannot bind a blob as {self:?}"
                )))
            }
        };
        Ok(coerced)
    }
}

/// Truncates toward zero; NaN, infinities and values outside the `i64`
/// range are rejected.
fn float_to_i64(f: f64) -> Result<i64> {
    let t = f.trunc();
    // -2^63 is exact as f64, 2^63 is one past i64::MAX
    if !t.is_finite() || t < -9_223_372_036_854_775_808.0 || t >= 9_223_372_036_854_775_808.0 {
        return Err(FacadeError::Param(format!("{f} does not fit an integer")));
    }
    Ok(t as i64)
}

/// Per-parameter type hints, e.g. `"isd"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHints(Vec<ParamType>);

impl TypeHints {
    /// Every parameter bound as text.
    pub fn all_text(count: usize) -> Self {
        TypeHints(vec![ParamType::Text; count])
    }

    pub fn as_slice(&self) -> &[ParamType] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for TypeHints {
    type Err = FacadeError;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| {
                ParamType::from_char(c).ok_or_else(|| {
                    FacadeError::Param(format!(
                        "Unknown type hint: '{c}'. Supported hints: i, d, s, b"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(TypeHints)
    }
}

impl From<Vec<ParamType>> for TypeHints {
    fn from(types: Vec<ParamType>) -> Self {
        TypeHints(types)
    }
}

/// Binds `params` according to `hints` (text for all when `None`).
pub fn bind_values(params: &[Value], hints: Option<&TypeHints>) -> Result<Vec<SqlValue>> {
    let hints = match hints {
        Some(h) if h.len() != params.len() => {
            return Err(FacadeError::Param(format!(
                "{} type hint(s) for {} parameter(s)",
                h.len(),
                params.len()
            )))
        }
        Some(h) => h.clone(),
        None => TypeHints::all_text(params.len()),
    };

    params
        .iter()
        .zip(hints.as_slice())
        .map(|(value, ty)| ty.coerce(value))
        .collect()
}

/// What an executed prepared statement left behind. The driver statement
/// itself is already finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementOutcome {
    result: QueryResult,
}

impl StatementOutcome {
    pub fn affected_rows(&self) -> u64 {
        self.result.affected_rows()
    }

    pub fn last_insert_id(&self) -> i64 {
        self.result.last_insert_id()
    }

    /// Whether the statement produced result columns.
    pub fn has_result_set(&self) -> bool {
        !self.result.columns().is_empty()
    }

    /// The result set; empty for statements without result columns.
    pub fn into_result(self) -> QueryResult {
        self.result
    }
}

impl Database {
    /// Prepares `sql`, binds `params` positionally and executes it once.
    ///
    /// `type_hints` is a string of `i`/`d`/`s`/`b`, one per parameter; when
    /// absent every parameter binds as text.
    ///
    /// # Errors
    ///
    /// `FacadeError::Param` for bad hints or values that do not fit their
    /// hint, `FacadeError::Query` (logged) when the driver rejects the
    /// statement or its execution, or when `sql` holds more than one
    /// statement. Nothing is executed in the last case.
    pub fn prepare_and_execute(
        &mut self,
        sql: &str,
        params: &[Value],
        type_hints: Option<&str>,
    ) -> Result<StatementOutcome> {
        let hints = type_hints.map(str::parse::<TypeHints>).transpose()?;
        let values = bind_values(params, hints.as_ref())?;

        let conn = self.connect()?;
        let mut batch = Batch::new(conn, sql);
        let mut stmt = match batch.next() {
            Ok(Some(stmt)) => stmt,
            Ok(None) => {
                return Err(log_query_error(FacadeError::Query {
                    code: 0,
                    message: "Query was empty".to_string(),
                }))
            }
            Err(e) => return Err(log_query_error(FacadeError::from_driver(&e))),
        };
        // only one statement may be prepared; trailing SQL is refused before anything runs
        if !matches!(batch.next(), Ok(None)) {
            return Err(log_query_error(FacadeError::Query {
                code: 0,
                message: "prepared statements take a single SQL statement".to_string(),
            }));
        }
        let result = read_statement(conn, &mut stmt, params_from_iter(values.iter()))
            .map_err(|e| log_query_error(FacadeError::from_driver(&e)))?;
        drop(stmt);

        debug!(
            params = params.len(),
            rows = result.row_count(),
            "prepared statement executed"
        );
        Ok(StatementOutcome { result })
    }

    /// Like [`Database::prepare_and_execute`] but returns the result set.
    pub fn prepare_and_fetch(
        &mut self,
        sql: &str,
        params: &[Value],
        type_hints: Option<&str>,
    ) -> Result<QueryResult> {
        self.prepare_and_execute(sql, params, type_hints)
            .map(StatementOutcome::into_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::query::{scalar, to_rows};
    use crate::test_utils::Fixture;

    #[test]
    fn test_type_hint_parsing() {
        let hints: TypeHints = "isdb".parse().unwrap();
        assert_eq!(
            hints.as_slice(),
            &[
                ParamType::Integer,
                ParamType::Text,
                ParamType::Float,
                ParamType::Blob
            ]
        );
        assert!(matches!("ix".parse::<TypeHints>(), Err(FacadeError::Param(_))));
    }

    #[test]
    fn test_coercion() {
        assert_eq!(
            ParamType::Integer.coerce(&Value::from(" 42 ")).unwrap(),
            SqlValue::Integer(42)
        );
        assert_eq!(
            ParamType::Integer.coerce(&Value::Float(3.9)).unwrap(),
            SqlValue::Integer(3)
        );
        assert_eq!(
            ParamType::Float.coerce(&Value::Integer(2)).unwrap(),
            SqlValue::Real(2.0)
        );
        assert_eq!(
            ParamType::Text.coerce(&Value::Integer(5)).unwrap(),
            SqlValue::Text("5".to_string())
        );
        assert_eq!(ParamType::Blob.coerce(&Value::Null).unwrap(), SqlValue::Null);
        assert!(ParamType::Integer.coerce(&Value::from("abc")).is_err());
    }

    #[test]
    fn test_bind_values_defaults_to_text() {
        let values = bind_values(&[Value::Integer(1), Value::Bool(true)], None).unwrap();
        assert_eq!(
            values,
            vec![SqlValue::Text("1".to_string()), SqlValue::Text("1".to_string())]
        );
    }

    #[test]
    fn test_bind_values_hint_count_mismatch() {
        let hints: TypeHints = "ii".parse().unwrap();
        assert!(matches!(
            bind_values(&[Value::Integer(1)], Some(&hints)),
            Err(FacadeError::Param(_))
        ));
    }

    #[test]
    fn test_prepare_and_fetch() {
        let mut fixture = Fixture::with_sample_data();
        let mut result = fixture
            .db
            .prepare_and_fetch(
                "SELECT name FROM users WHERE id = ? AND score > ?",
                &[Value::from("1"), Value::from("10")],
                Some("id"),
            )
            .unwrap();

        assert_eq!(scalar(&mut result).unwrap(), Some(Value::from("alice")));
    }

    #[test]
    fn test_prepare_and_execute_insert() {
        let mut fixture = Fixture::with_sample_data();
        let outcome = fixture
            .db
            .prepare_and_execute(
                "INSERT INTO users (name, score) VALUES (?, ?)",
                &[Value::from("O'Brien"), Value::Float(3.5)],
                None,
            )
            .unwrap();

        assert_eq!(outcome.affected_rows(), 1);
        assert!(!outcome.has_result_set());

        let mut result = fixture
            .db
            .prepare_and_fetch(
                "SELECT name, score FROM users WHERE id = ?",
                &[Value::Integer(outcome.last_insert_id())],
                Some("i"),
            )
            .unwrap();
        let rows = to_rows(&mut result, true, true).unwrap();
        assert_eq!(rows[0].get("name"), Some(&Value::from("O'Brien")));
        // bound as text, stored by column affinity as REAL
        assert_eq!(rows[0].get("score"), Some(&Value::Float(3.5)));
    }

    #[test]
    fn test_prepare_error_is_query_failure() {
        let mut fixture = Fixture::new();
        let err = fixture
            .db
            .prepare_and_execute("SELEC nonsense", &[], None)
            .unwrap_err();
        assert!(err.is_query_failure());
    }

    #[test]
    fn test_trailing_statement_is_refused() {
        let mut fixture = Fixture::new();
        fixture.db.execute("CREATE TABLE t (x INTEGER)").unwrap();
        fixture.db.execute("INSERT INTO t VALUES (1)").unwrap();

        let err = fixture
            .db
            .prepare_and_execute(
                "INSERT INTO t VALUES (?); INSERT INTO t VALUES (9)",
                &[Value::Integer(5)],
                Some("i"),
            )
            .unwrap_err();
        assert!(err.is_query_failure());

        let values = fixture
            .db
            .scalar_sql("SELECT group_concat(x) FROM t")
            .unwrap();
        assert_eq!(values, Some(Value::from("1")));
    }

    #[test]
    fn test_trailing_semicolon_is_accepted() {
        let mut fixture = Fixture::new();
        let mut result = fixture
            .db
            .prepare_and_fetch("SELECT ?; ", &[Value::Integer(3)], Some("i"))
            .unwrap();
        assert_eq!(scalar(&mut result).unwrap(), Some(Value::Integer(3)));
    }

    #[test]
    fn test_float_out_of_integer_range_is_refused() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e19, -1e19] {
            assert!(matches!(
                ParamType::Integer.coerce(&Value::Float(f)),
                Err(FacadeError::Param(_))
            ));
        }
        assert_eq!(
            ParamType::Integer.coerce(&Value::Float(-2.7)).unwrap(),
            SqlValue::Integer(-2)
        );

        let mut fixture = Fixture::new();
        let err = fixture
            .db
            .prepare_and_fetch("SELECT ?", &[Value::Float(f64::NAN)], Some("i"))
            .unwrap_err();
        assert!(matches!(err, FacadeError::Param(_)));
    }

    #[test]
    fn test_wrong_parameter_count_is_query_failure() {
        let mut fixture = Fixture::with_sample_data();
        let err = fixture
            .db
            .prepare_and_fetch("SELECT * FROM users WHERE id = ?", &[], None)
            .unwrap_err();
        assert!(err.is_query_failure());
    }
}
