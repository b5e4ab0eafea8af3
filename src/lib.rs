// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod config;
pub mod escape;
pub mod form;
pub mod results_table;
pub mod shared;
pub mod value;

#[cfg(test)]
mod test_utils;

pub use crate::config::DbConfig;
pub use crate::core::db::{
    field_names, scalar, to_rows, ConnectionState, Database, ParamType, QueryResult, Row,
    StatementOutcome, TypeHints,
};
pub use crate::core::{FacadeError, Result};
pub use crate::escape::{escape, escape_html, escape_sql};
pub use crate::form::{
    form_field_or_default, quoted_field_or_default, search_field_or_default, FormData,
};
pub use crate::results_table::{to_json, to_table, TableOptions};
pub use crate::value::Value;
