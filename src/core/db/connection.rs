/// Connection Management Module
///
/// This module owns the facade's single connection: it is opened lazily on
/// first use, reused for every later call, and released only by `close`.

use crate::config::DbConfig;
use crate::core::{FacadeError, Result};
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

/// Lifecycle state of the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been opened, or it was closed
    Absent,
    /// A connection is open and will be reused
    Established,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Absent
    }
}

/// The database facade.
///
/// Holds the configuration and at most one live connection. Every operation
/// that needs the database goes through [`Database::connect`], so the first
/// one opens the connection.
#[derive(Debug)]
pub struct Database {
    config: DbConfig,
    /// Active connection (None while absent)
    connection: Option<Connection>,
    /// Incremented each time a connection is established
    generation: u64,
}

impl Database {
    /// Creates a facade; no connection is opened until first use.
    pub fn new(config: DbConfig) -> Self {
        Database {
            config,
            connection: None,
            generation: 0,
        }
    }

    /// Creates a facade around an already opened connection.
    ///
    /// After `close`, the next `connect` opens `config.database` as usual.
    pub fn with_connection(config: DbConfig, connection: Connection) -> Self {
        Database {
            config,
            connection: Some(connection),
            generation: 1,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Returns the connection, opening it on first call.
    ///
    /// # Errors
    ///
    /// `FacadeError::Connect` if the database cannot be opened,
    /// `FacadeError::Config` if the configured charset is not supported.
    pub fn connect(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let conn = open(&self.config)?;
            self.generation += 1;
            info!(
                database = %self.config.database,
                connection_id = self.generation,
                "database connection established"
            );
            self.connection = Some(conn);
        }

        match self.connection.as_ref() {
            Some(conn) => Ok(conn),
            None => Err(FacadeError::App("connection missing after connect".to_string())),
        }
    }

    /// Releases the connection if one is open.
    ///
    /// Calling this without an open connection is a no-op that succeeds.
    /// If the driver refuses to close, the connection is kept and the
    /// error is returned.
    pub fn close(&mut self) -> Result<()> {
        let Some(conn) = self.connection.take() else {
            debug!("close called without an open connection");
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!(connection_id = self.generation, "database connection closed");
                Ok(())
            }
            Err((conn, e)) => {
                error!("failed to close database connection: {e}");
                self.connection = Some(conn);
                Err(FacadeError::Database(e))
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Established
        } else {
            ConnectionState::Absent
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Established
    }

    /// Identifier of the live connection, `None` while absent.
    ///
    /// Two calls return the same id for as long as the connection stays open;
    /// a connection opened after `close` gets a new one.
    pub fn connection_id(&self) -> Option<u64> {
        self.connection.as_ref().map(|_| self.generation)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("database connection dropped with error: {e}");
        }
    }
}

fn open(config: &DbConfig) -> Result<Connection> {
    if config.has_credentials() {
        warn!(
            host = config.host.as_deref().unwrap_or(""),
            user = config.user.as_deref().unwrap_or(""),
            "host/user/password are not used by the SQLite backend"
        );
    }

    let conn = Connection::open(&config.database).map_err(|e| {
        error!(database = %config.database, "connection failed: {e}");
        FacadeError::Connect(e.to_string())
    })?;

    if let Some(charset) = config.charset.as_deref() {
        let encoding = sqlite_encoding(charset)?;
        conn.pragma_update(None, "encoding", encoding).map_err(|e| {
            error!("failed to set encoding {encoding}: {e}");
            FacadeError::Connect(e.to_string())
        })?;
        debug!("connection encoding set to {encoding}");
    }

    Ok(conn)
}

/// Maps a configured charset name onto a SQLite `PRAGMA encoding` value.
fn sqlite_encoding(charset: &str) -> Result<&'static str> {
    match charset.to_ascii_lowercase().as_str() {
        "utf8" | "utf8mb4" | "utf-8" => Ok("UTF-8"),
        "utf16" | "utf-16" => Ok("UTF-16"),
        "utf16le" | "utf-16le" => Ok("UTF-16le"),
        "utf16be" | "utf-16be" => Ok("UTF-16be"),
        other => Err(FacadeError::Config(format!(
            "Unsupported charset: '{other}'. Supported charsets: utf8, utf8mb4, utf16, utf16le, utf16be"
        ))),
    }
}
