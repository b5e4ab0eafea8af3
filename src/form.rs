//! Form field helpers.
//!
//! Reads fields from an `application/x-www-form-urlencoded` request body and
//! passes them through [`escape`](crate::escape::escape) before they are
//! spliced into SQL text.

use crate::core::{FacadeError, Result};
use crate::escape::escape;
use crate::value::Value;
use indexmap::IndexMap;

/// Decoded form fields, in the order they first appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: IndexMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        FormData::default()
    }

    /// Parses a urlencoded body. `+` decodes to a space; a repeated name
    /// keeps the last value.
    pub fn parse(body: &str) -> Result<Self> {
        let mut fields = IndexMap::new();
        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            fields.insert(decode(name)?, decode(value)?);
        }
        Ok(FormData { fields })
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn decode(component: &str) -> Result<String> {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| FacadeError::Form(format!("invalid encoding in '{component}': {e}")))
}

fn field_or_default(form: &FormData, name: &str, default: Value) -> Value {
    form.get(name).map_or(default, Value::from)
}

/// Field `name` (or `default` when missing), escaped.
pub fn form_field_or_default(form: &FormData, name: &str, default: impl Into<Value>) -> String {
    escape(&field_or_default(form, name, default.into()))
}

/// Like [`form_field_or_default`], with `*` turned into the SQL `%` wildcard.
pub fn search_field_or_default(form: &FormData, name: &str, default: impl Into<Value>) -> String {
    form_field_or_default(form, name, default).replace('*', "%")
}

/// Like [`form_field_or_default`], but an empty value becomes the bare
/// token `NULL`, and with `quote` set anything else is wrapped in single
/// quotes.
pub fn quoted_field_or_default(
    form: &FormData,
    name: &str,
    default: impl Into<Value>,
    quote: bool,
) -> String {
    let value = form_field_or_default(form, name, default);
    if value.is_empty() {
        "NULL".to_string()
    } else if quote {
        format!("'{value}'")
    } else {
        value
    }
}
