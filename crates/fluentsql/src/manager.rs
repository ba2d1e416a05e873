//! Connection manager: one lazily-opened connection plus transactions.
//!
//! ```ignore
//! use fluentsql::prelude::*;
//! use fluentsql::{Manager, SqliteConnector};
//!
//! let db = Manager::new(SqliteConnector::in_memory());
//! db.statement("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", Params::none())?;
//!
//! let id = db.table("users").insert(&db, &[("name", "alice".into())])?;
//! let user = db.table("users").where_("id", id).first(&db)?;
//! ```

use crate::binding::Params;
use crate::builder::QueryBuilder;
use crate::config::ManagerConfig;
use crate::driver::{Connection, Connector, Execution};
use crate::error::{SqlError, SqlResult};
use crate::executor::{self, Executor};
use crate::hook::{QueryContext, QueryHook, TracingSqlHook};
use crate::row::Row;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// Where the manager's connection currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection attempt yet.
    Unconnected,
    /// A connection is open and cached.
    Connected,
    /// The last connection attempt failed; the next call will try again.
    Failed,
}

/// Owns a single connection, created on first use and reused afterwards.
///
/// Access to the connection is serialized by a mutex held for one statement
/// at a time. Transactions are connection-wide, so a manager shared between
/// threads sees one logical transaction; use one manager per worker when
/// that matters.
pub struct Manager<C: Connector> {
    connector: C,
    config: ManagerConfig,
    conn: Mutex<Option<C::Connection>>,
    failed: AtomicBool,
    hook: RwLock<Option<Arc<dyn QueryHook>>>,
}

impl<C: Connector> Manager<C> {
    /// Create a manager with default configuration. Nothing connects yet.
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, ManagerConfig::default())
    }

    /// Create a manager with explicit configuration.
    pub fn with_config(connector: C, config: ManagerConfig) -> Self {
        let manager = Self {
            connector,
            config,
            conn: Mutex::new(None),
            failed: AtomicBool::new(false),
            hook: RwLock::new(None),
        };
        if manager.config.debug {
            manager.set_debug(true);
        }
        manager
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Start a query builder on `table` (`"table"` or `"table alias"`).
    pub fn table(&self, table: &str) -> QueryBuilder {
        QueryBuilder::table(table)
    }

    /// Install a statement hook, replacing any previous one.
    pub fn set_hook(&self, hook: impl QueryHook + 'static) {
        if let Ok(mut slot) = self.hook.write() {
            *slot = Some(Arc::new(hook));
        }
    }

    /// Remove the statement hook.
    pub fn clear_hook(&self) {
        if let Ok(mut slot) = self.hook.write() {
            *slot = None;
        }
    }

    /// Toggle the tracing debug hook that emits SQL text and bindings.
    pub fn set_debug(&self, enabled: bool) {
        if enabled {
            let mut hook = TracingSqlHook::new().level(self.config.debug_level);
            hook.max_sql_length = self.config.max_sql_length;
            self.set_hook(hook);
        } else {
            self.clear_hook();
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        let connected = self.conn.lock().map(|c| c.is_some()).unwrap_or(false);
        if connected {
            ConnectionState::Connected
        } else if self.failed.load(Ordering::Acquire) {
            ConnectionState::Failed
        } else {
            ConnectionState::Unconnected
        }
    }

    /// Open the connection now instead of on first statement.
    pub fn connect(&self) -> SqlResult<()> {
        self.with_connection(|_| Ok(()))
    }

    /// Run `body` in a transaction: commit on `Ok`, roll back on `Err` and
    /// return the original error unchanged.
    pub fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<SqlError>,
    {
        executor::transaction(self, body)
    }

    fn open(&self) -> SqlResult<C::Connection> {
        match self.connector.connect() {
            Ok(conn) => {
                self.failed.store(false, Ordering::Release);
                tracing::debug!(target: "fluentsql.conn", "connection opened");
                Ok(conn)
            }
            Err(err) => {
                self.failed.store(true, Ordering::Release);
                tracing::warn!(target: "fluentsql.conn", error = %err, "connection failed");
                Err(err)
            }
        }
    }

    fn with_connection<R>(
        &self,
        f: impl FnOnce(&mut C::Connection) -> SqlResult<R>,
    ) -> SqlResult<R> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| SqlError::Connection("connection lock poisoned".to_string()))?;
        // On failure the slot stays empty, so the next call retries.
        let conn = match guard.take() {
            Some(conn) => conn,
            None => self.open()?,
        };
        let conn = guard.insert(conn);
        f(conn)
    }

    fn notify(&self, sql: &str, params: &Params) {
        let hook = self.hook.read().ok().and_then(|slot| slot.clone());
        if let Some(hook) = hook {
            hook.before_query(&QueryContext::new(sql, params));
        }
    }

    fn control(&self, sql: &'static str) -> SqlResult<()> {
        self.notify(sql, &Params::none());
        tracing::debug!(target: "fluentsql.tx", "{sql}");
        self.with_connection(|conn| conn.batch(sql))
    }
}

impl<C: Connector> Executor for Manager<C> {
    fn query(&self, sql: &str, params: &Params) -> SqlResult<Vec<Row>> {
        self.notify(sql, params);
        let start = Instant::now();
        let rows = self.with_connection(|conn| conn.query(sql, params))?;
        tracing::debug!(
            target: "fluentsql.exec",
            rows = rows.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "query"
        );
        Ok(rows)
    }

    fn execute(&self, sql: &str, params: &Params) -> SqlResult<Execution> {
        self.notify(sql, params);
        let start = Instant::now();
        let outcome = self.with_connection(|conn| conn.execute(sql, params))?;
        tracing::debug!(
            target: "fluentsql.exec",
            affected = outcome.affected_rows,
            elapsed_us = start.elapsed().as_micros() as u64,
            "execute"
        );
        Ok(outcome)
    }

    fn begin(&self) -> SqlResult<()> {
        self.control("BEGIN")
    }

    fn commit(&self) -> SqlResult<()> {
        self.control("COMMIT")
    }

    fn rollback(&self) -> SqlResult<()> {
        self.control("ROLLBACK")
    }
}

impl<C: Connector + std::fmt::Debug> std::fmt::Debug for Manager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("connector", &self.connector)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests;
