//! Driver seam.
//!
//! A [`Connector`] opens one physical [`Connection`]; the connection runs SQL
//! text with [`Params`]. The [`crate::Manager`] owns exactly one connection,
//! created lazily through its connector.
//!
//! The bundled SQLite driver lives in [`sqlite`] (feature `sqlite`).

use crate::binding::Params;
use crate::error::SqlResult;
use crate::row::Row;

#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Execution {
    /// Rows inserted, updated or deleted.
    pub affected_rows: u64,
    /// Identifier of the last inserted row, when the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// One open database handle.
///
/// Implementations prepare `sql`, bind every parameter (by `:name` for
/// [`Params::Named`], 1-based for [`Params::Positional`]) and run it. Driver
/// failures are returned as [`crate::SqlError::Execution`] carrying the
/// native error.
pub trait Connection: Send {
    /// Run a row-returning statement.
    fn query(&mut self, sql: &str, params: &Params) -> SqlResult<Vec<Row>>;

    /// Run a statement and report affected rows / last insert id.
    fn execute(&mut self, sql: &str, params: &Params) -> SqlResult<Execution>;

    /// Run parameterless SQL (transaction control).
    fn batch(&mut self, sql: &str) -> SqlResult<()>;
}

/// Opens connections. Called at most once per successful connection.
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Open a new connection, or fail with [`crate::SqlError::Connection`].
    fn connect(&self) -> SqlResult<Self::Connection>;
}
