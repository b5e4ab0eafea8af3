//! Column and parameter values.
//!
//! Every value that crosses the facade, in either direction, is a [`Value`].
//! The string form used for escaping and HTML output is the `Display` impl.

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde::Serialize;
use std::fmt;

/// A single database value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Blob(Vec<u8>),
}

impl Value {
    /// Converts into the driver's owned value. Booleans are stored as 0/1.
    pub fn to_sql(&self) -> SqlValue {
        match self {
            Value::Null => SqlValue::Null,
            Value::Integer(i) => SqlValue::Integer(*i),
            Value::Float(f) => SqlValue::Real(*f),
            Value::Text(s) => SqlValue::Text(s.clone()),
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Blob(b) => SqlValue::Blob(b.clone()),
        }
    }
}

/// String form of a value:
/// NULL and `false` render empty, `true` renders `1`, floats use the shortest
/// representation that round-trips (`1.0` renders `1`), blobs are decoded as
/// lossy UTF-8.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("1"),
            Value::Bool(false) => Ok(()),
            Value::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rules() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Integer(-42).to_string(), "-42");
        assert_eq!(Value::Float(1.0).to_string(), "1");
        assert_eq!(Value::Float(123.45).to_string(), "123.45");
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(Value::Bool(false).to_string(), "");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Blob(b"Hello".to_vec()).to_string(), "Hello");
    }

    #[test]
    fn test_from_driver_values() {
        assert_eq!(Value::from(ValueRef::Null), Value::Null);
        assert_eq!(Value::from(ValueRef::Integer(7)), Value::Integer(7));
        assert_eq!(Value::from(ValueRef::Real(0.5)), Value::Float(0.5));
        assert_eq!(Value::from(ValueRef::Text(b"x")), Value::Text("x".into()));
        assert_eq!(Value::from(ValueRef::Blob(&[1, 2])), Value::Blob(vec![1, 2]));
    }

    #[test]
    fn test_to_sql_stores_bool_as_integer() {
        assert_eq!(Value::Bool(true).to_sql(), SqlValue::Integer(1));
        assert_eq!(Value::from(None::<i64>).to_sql(), SqlValue::Null);
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Integer(1),
            Value::Text("a".into()),
            Value::Null,
        ])
        .unwrap();
        assert_eq!(json, r#"[1,"a",null]"#);
    }
}
