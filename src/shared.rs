//! Process-wide facade.
//!
//! For callers that want one connection for the whole process instead of
//! passing a [`Database`] around. The instance lives behind a mutex, so
//! concurrent callers are serialized.

use crate::config::DbConfig;
use crate::core::db::Database;
use crate::core::{FacadeError, Result};
use once_cell::sync::OnceCell;
use std::sync::Mutex;
use tracing::debug;

static SHARED: OnceCell<Mutex<Database>> = OnceCell::new();

/// Installs the process-wide database. No connection is opened yet.
///
/// # Errors
///
/// `FacadeError::Config` if it was already initialized.
pub fn init(config: DbConfig) -> Result<()> {
    SHARED
        .set(Mutex::new(Database::new(config)))
        .map_err(|_| FacadeError::Config("shared database is already initialized".to_string()))?;
    debug!("shared database initialized");
    Ok(())
}

pub fn is_initialized() -> bool {
    SHARED.get().is_some()
}

/// Runs `f` with exclusive access to the shared database.
pub fn with_database<T, F>(f: F) -> Result<T>
where
    F: FnOnce(&mut Database) -> Result<T>,
{
    let cell = SHARED
        .get()
        .ok_or_else(|| FacadeError::Config("shared database is not initialized".to_string()))?;
    let mut guard = cell
        .lock()
        .map_err(|_| FacadeError::App("Failed to acquire database lock".to_string()))?;
    f(&mut *guard)
}

/// Closes the shared connection. Succeeds when nothing was initialized.
pub fn close() -> Result<()> {
    if !is_initialized() {
        return Ok(());
    }
    with_database(Database::close)
}
