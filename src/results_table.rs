//! Results Table Module
//!
//! Renders a materialized result set as a simple styled HTML table, or as
//! JSON for callers that want structured output.

use crate::core::db::query::{to_rows, QueryResult};
use crate::core::Result;
use crate::escape::escape_html;

const TABLE_STYLE: &str =
    "line-height:1.25rem;border-collapse:collapse;font-size:0.9rem;margin:0.1rem;font-style:serif;";
const CAPTION_STYLE: &str = "font-size:1rem;font-weight:bold;text-align:center;";

/// Presentation options for [`to_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Caption text; no caption element when empty.
    pub caption: String,
    /// Raw markup placed before the header row, e.g. `<col width='20%'>`.
    pub column_widths: String,
    /// Value of the table's `width` attribute.
    pub width: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            caption: String::new(),
            column_widths: String::new(),
            width: "100%".to_string(),
        }
    }
}

impl TableOptions {
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_column_widths(mut self, markup: impl Into<String>) -> Self {
        self.column_widths = markup.into();
        self
    }

    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = width.into();
        self
    }
}

/// Renders the whole result set as an HTML table: one header row of column
/// names, then one row per result row. Text is HTML-escaped; NULL renders
/// as an empty cell. The result is released afterwards when `free` is set.
pub fn to_table(result: &mut QueryResult, options: &TableOptions, free: bool) -> Result<String> {
    result.ensure_live()?;

    let mut table = format!(
        "<table width='{}' border='1' style='{TABLE_STYLE}'>\n",
        escape_html(&options.width)
    );

    if !options.caption.is_empty() {
        table.push_str(&format!(
            "<caption style='{CAPTION_STYLE}'>{}</caption>\n",
            escape_html(&options.caption)
        ));
    }

    table.push_str(&options.column_widths);
    table.push_str("<tr>");
    for name in result.columns() {
        table.push_str(&format!("<th align='center'>{}</th>", escape_html(name)));
    }
    table.push_str("</tr>\n");

    for row in result.rows() {
        table.push_str("<tr>");
        for value in row {
            table.push_str(&format!("<td>{}</td>", escape_html(&value.to_string())));
        }
        table.push_str("</tr>\n");
    }
    table.push_str("</table>\n");

    if free {
        result.free();
    }
    Ok(table)
}

/// Serializes the result set as a JSON array of `{column: value}` objects.
pub fn to_json(result: &mut QueryResult, free: bool) -> Result<String> {
    let rows = to_rows(result, true, free)?;
    Ok(serde_json::to_string(&rows)?)
}
