//! Value sanitization.
//!
//! [`escape`] is the legacy all-in-one pipeline for values that get pasted
//! into SQL text. New code should bind parameters instead
//! (`Database::prepare_and_execute`) and call [`escape_html`] only when
//! producing markup.

use crate::value::Value;

/// Characters removed by [`trim`].
const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Formats a value for literal interpolation inside a single-quoted SQL
/// string: string form, trimmed, backslash escapes removed, HTML-escaped,
/// then SQL-escaped.
pub fn escape(value: &Value) -> String {
    let data = value.to_string();
    let data = strip_slashes(trim(&data));
    escape_sql(&escape_html(&data))
}

/// Strips spaces, tabs, newlines, carriage returns, NUL and vertical tabs
/// from both ends.
pub fn trim(s: &str) -> &str {
    s.trim_matches(TRIM_CHARS)
}

/// Removes backslash escaping: `\x` becomes `x`, `\\` becomes `\`, `\0`
/// becomes NUL and a trailing lone backslash is dropped.
pub fn strip_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some(next) => out.push(next),
            None => {}
        }
    }
    out
}

/// Escapes `&`, `<`, `>`, `"` and `'` for HTML text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Makes `s` safe inside a single-quoted SQLite string literal: quotes are
/// doubled and NUL characters, which would end the statement text, are
/// dropped.
pub fn escape_sql(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\0' => {}
            _ => out.push(c),
        }
    }
    out
}
