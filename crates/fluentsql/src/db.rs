//! Process-wide default executor.
//!
//! Nothing is installed by default. Applications that prefer a global entry
//! point install a [`crate::Manager`] once at startup; tests can swap it for a
//! fake and uninstall it afterwards.
//!
//! ```ignore
//! use fluentsql::{db, Manager, SqliteConnector};
//!
//! db::install(Manager::new(SqliteConnector::in_memory()));
//!
//! let exec = db::executor()?;
//! let users = db::table("users").where_("active", true).get(&exec)?;
//! ```

use crate::binding::Params;
use crate::builder::QueryBuilder;
use crate::error::{SqlError, SqlResult};
use crate::executor::{self, Executor};
use crate::row::Row;
use std::sync::{Arc, RwLock};

/// The shared executor type.
pub type SharedExecutor = Arc<dyn Executor + Send + Sync>;

static DEFAULT: RwLock<Option<SharedExecutor>> = RwLock::new(None);

/// Install `executor` as the default, replacing any previous one.
pub fn install(executor: impl Executor + Send + Sync + 'static) {
    install_shared(Arc::new(executor));
}

/// Install an already shared executor as the default.
pub fn install_shared(executor: SharedExecutor) {
    let mut slot = DEFAULT.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = Some(executor);
    tracing::debug!(target: "fluentsql.conn", "default executor installed");
}

/// Remove the default executor and return it.
pub fn uninstall() -> Option<SharedExecutor> {
    let mut slot = DEFAULT.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.take()
}

/// Whether a default executor is installed.
pub fn is_installed() -> bool {
    DEFAULT.read().map(|slot| slot.is_some()).unwrap_or(false)
}

/// The installed default executor.
pub fn executor() -> SqlResult<SharedExecutor> {
    let slot = DEFAULT.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.clone()
        .ok_or_else(|| SqlError::Config("no default executor installed".to_string()))
}

/// Start a query builder on `table`.
pub fn table(table: &str) -> QueryBuilder {
    QueryBuilder::table(table)
}

/// Raw SELECT on the default executor.
pub fn select(sql: &str, params: Params) -> SqlResult<Vec<Row>> {
    executor()?.select(sql, params)
}

/// Raw SELECT returning the first row.
pub fn select_one(sql: &str, params: Params) -> SqlResult<Option<Row>> {
    executor()?.select_one(sql, params)
}

/// Raw statement returning the affected row count.
pub fn statement(sql: &str, params: Params) -> SqlResult<u64> {
    executor()?.statement(sql, params)
}

/// Run `body` in a transaction on the default executor.
pub fn transaction<T, E, F>(body: F) -> Result<T, E>
where
    F: FnOnce(&(dyn Executor + Send + Sync + 'static)) -> Result<T, E>,
    E: From<SqlError>,
{
    let exec = executor()?;
    executor::transaction(&*exec, body)
}
