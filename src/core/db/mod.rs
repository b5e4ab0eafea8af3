/// Database Module
///
/// The facade's database layer, split into focused submodules:
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): the `Database` type, lazy
///   connection, close and lifecycle state
/// - **Query Execution** (`query.rs`): statement execution and result
///   materialization (scalar, rows, key/value maps)
/// - **Prepared Statements** (`prepared.rs`): positional binding with type hints
///
/// ## Error Handling
///
/// Statement failures are logged and returned as `FacadeError::Query`; nothing
/// in this layer panics or terminates the process.
pub mod connection;
pub mod prepared;
pub mod query;

pub use connection::*;
pub use prepared::*;
pub use query::*;
