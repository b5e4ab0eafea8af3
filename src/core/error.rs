/// Facade Error Module
///
/// This module defines the error type shared by every part of the facade.
/// Connection failures and statement failures are kept apart so callers can
/// tell "no database" from "this query did not work".
use thiserror::Error;

/// Error type for the database facade.
///
/// Covers:
/// - Connection establishment (the facade never terminates the process)
/// - Statement execution failures reported by the driver
/// - Parameter binding and result shape problems
/// - Configuration loading and form decoding
#[derive(Error, Debug)]
pub enum FacadeError {
    /// The connection could not be opened or initialized
    #[error("Database connection could not be established: {0}")]
    Connect(String),

    /// A statement failed; `code` is the driver's extended result code
    #[error("Query error ({code}) {message}")]
    Query { code: i32, message: String },

    /// Any other error raised by the driver
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Bad parameters or type hints for a prepared statement
    #[error("Parameter error: {0}")]
    Param(String),

    /// The result set does not have the columns an operation needs
    #[error("Result shape error: {0}")]
    Shape(String),

    /// The result set was already released
    #[error("Result error: the result set has already been released")]
    ResultReleased,

    /// Malformed form-encoded input
    #[error("Form error: {0}")]
    Form(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected internal conditions (poisoned locks and the like)
    #[error("Application error: {0}")]
    App(String),
}

impl FacadeError {
    /// Builds a `Query` error from a driver error, keeping the extended
    /// result code when the driver reports one.
    pub fn from_driver(err: &rusqlite::Error) -> Self {
        let (code, message) = match err {
            rusqlite::Error::SqliteFailure(e, Some(msg)) => (e.extended_code, msg.clone()),
            rusqlite::Error::SqliteFailure(e, None) => (e.extended_code, e.to_string()),
            other => (0, other.to_string()),
        };
        FacadeError::Query { code, message }
    }

    /// Returns true for the "no result" sentinel produced by a failed statement.
    pub fn is_query_failure(&self) -> bool {
        matches!(self, FacadeError::Query { .. })
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FacadeError>;
