//! Error types for fluentsql

use thiserror::Error;

/// Result type alias for fluentsql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Boxed driver error, kept as the driver produced it.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum SqlError {
    /// Comparison operator outside the supported set
    #[error("Unsupported operator: {0}")]
    InvalidOperator(String),

    /// INSERT/UPDATE called without any column
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// ORDER BY direction other than ASC/DESC
    #[error("Invalid order direction: {0} (expected ASC or DESC)")]
    InvalidDirection(String),

    /// Database connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// The driver rejected a prepared/bound/executed statement
    #[error("Execution error: {0}")]
    Execution(#[source] DriverError),

    /// Row value could not be converted to the requested type
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Wrap a native driver error.
    pub fn execution(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Execution(Box::new(err))
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this error was raised while building a statement, before
    /// anything reached the driver.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperator(_) | Self::EmptyInput(_) | Self::InvalidDirection(_)
        )
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is a driver execution error
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Borrow the native driver error, if this is an execution error of type `E`.
    pub fn driver_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Execution(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for SqlError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Execution(Box::new(err))
    }
}
