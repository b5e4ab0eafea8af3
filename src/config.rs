use crate::core::{FacadeError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DbConfig,
}

/// Connection settings, read once when the connection is created.
///
/// `host`, `user` and `password` describe a server-backed database; the SQLite
/// backend opens `database` as a file path (or `:memory:`) and ignores them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DbConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub charset: Option<String>,
}

impl DbConfig {
    /// Creates a configuration for the given database with no credentials.
    pub fn new(database: impl Into<String>) -> Self {
        DbConfig {
            host: None,
            user: None,
            password: None,
            database: database.into(),
            charset: None,
        }
    }

    /// Configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        DbConfig::new(":memory:")
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_credentials(
        mut self,
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.host = Some(host.into());
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Reads `DB_HOST`, `DB_USER`, `DB_PASS`, `DB_NAME` and `DB_CHAR`.
    /// Only `DB_NAME` is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = lookup("DB_NAME")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FacadeError::Config("DB_NAME is not set".to_string()))?;

        Ok(DbConfig {
            host: lookup("DB_HOST"),
            user: lookup("DB_USER"),
            password: lookup("DB_PASS"),
            database,
            charset: lookup("DB_CHAR").filter(|c| !c.is_empty()),
        })
    }

    /// Whether any server credential is set.
    pub fn has_credentials(&self) -> bool {
        self.host.is_some() || self.user.is_some() || self.password.is_some()
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = sqlfacade::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config.database);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| FacadeError::Config(e.to_string()))
}

/// Default location of the configuration file: `<config dir>/sqlfacade/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlfacade").join("config.toml"))
}
