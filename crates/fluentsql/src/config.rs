//! Manager and driver configuration.

use crate::error::{SqlError, SqlResult};
use std::time::Duration;
use tracing::Level;

/// Configuration for [`crate::Manager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Emit every statement and its bindings through the tracing debug hook.
    pub debug: bool,
    /// Tracing level used by the debug hook.
    pub debug_level: Level,
    /// Truncate SQL in debug output (in bytes). `None` disables truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            debug_level: Level::DEBUG,
            max_sql_length: Some(500),
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the debug hook.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set the tracing level of the debug hook.
    pub fn debug_level(mut self, level: Level) -> Self {
        self.debug_level = level;
        self
    }

    /// Set maximum SQL length shown by the debug hook.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Never truncate SQL in debug output.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}

/// Connection settings for the bundled SQLite driver.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:`.
    pub database: String,
    /// How long to wait on a locked database before failing.
    pub busy_timeout: Option<Duration>,
    /// Run `PRAGMA foreign_keys = ON` after connecting.
    pub foreign_keys: bool,
    /// SQL run once right after the connection opens.
    pub init_sql: Option<String>,
}

impl SqliteConfig {
    /// Settings for a database file.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            busy_timeout: Some(Duration::from_secs(5)),
            foreign_keys: true,
            init_sql: None,
        }
    }

    /// Settings for a private in-memory database.
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// Read the database location from `DATABASE_URL`.
    ///
    /// Accepts a bare path or a `sqlite://` / `sqlite:` URL.
    pub fn from_env() -> SqlResult<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| SqlError::Config("DATABASE_URL is not set".to_string()))?;
        Self::from_url(&url)
    }

    /// Parse a bare path or a `sqlite://` / `sqlite:` URL.
    pub fn from_url(url: &str) -> SqlResult<Self> {
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
            .trim();
        if path.is_empty() {
            return Err(SqlError::Config(format!("no database path in '{url}'")));
        }
        Ok(Self::new(path))
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Enable or disable foreign key enforcement.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// SQL to run once after connecting (schema setup, pragmas).
    pub fn init_sql(mut self, sql: impl Into<String>) -> Self {
        self.init_sql = Some(sql.into());
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database == ":memory:"
    }
}
