/// Core Module
///
/// Shared infrastructure for the facade: the error type and the database
/// layer (connection lifecycle, query execution, prepared statements).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{FacadeError, Result};
