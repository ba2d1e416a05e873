//! The execution surface used by query builder terminals and raw-SQL callers.

use crate::binding::Params;
use crate::driver::Execution;
use crate::error::{SqlError, SqlResult};
use crate::row::Row;
use std::sync::Arc;

/// Something that can run SQL: normally a [`crate::Manager`].
///
/// The trait is object safe, so a `&dyn Executor` (or the facade's shared
/// default instance) works wherever a concrete manager does.
pub trait Executor {
    /// Run a row-returning statement.
    fn query(&self, sql: &str, params: &Params) -> SqlResult<Vec<Row>>;

    /// Run a statement that does not return rows.
    fn execute(&self, sql: &str, params: &Params) -> SqlResult<Execution>;

    /// Start a transaction.
    fn begin(&self) -> SqlResult<()>;

    /// Commit the current transaction.
    fn commit(&self) -> SqlResult<()>;

    /// Roll back the current transaction.
    fn rollback(&self) -> SqlResult<()>;

    /// Raw SELECT returning every row.
    fn select(&self, sql: &str, params: Params) -> SqlResult<Vec<Row>> {
        self.query(sql, &params)
    }

    /// Raw SELECT returning the first row, if any.
    fn select_one(&self, sql: &str, params: Params) -> SqlResult<Option<Row>> {
        Ok(self.query(sql, &params)?.into_iter().next())
    }

    /// Raw statement returning the affected row count.
    fn statement(&self, sql: &str, params: Params) -> SqlResult<u64> {
        Ok(self.execute(sql, &params)?.affected_rows)
    }
}

impl<X: Executor + ?Sized> Executor for &X {
    fn query(&self, sql: &str, params: &Params) -> SqlResult<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &Params) -> SqlResult<Execution> {
        (**self).execute(sql, params)
    }

    fn begin(&self) -> SqlResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> SqlResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> SqlResult<()> {
        (**self).rollback()
    }
}

impl<X: Executor + ?Sized> Executor for Arc<X> {
    fn query(&self, sql: &str, params: &Params) -> SqlResult<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &Params) -> SqlResult<Execution> {
        (**self).execute(sql, params)
    }

    fn begin(&self) -> SqlResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> SqlResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> SqlResult<()> {
        (**self).rollback()
    }
}

/// Rolls back on drop unless disarmed, so a panicking body still closes
/// the transaction.
struct RollbackGuard<'a, X: Executor + ?Sized> {
    db: &'a X,
    armed: bool,
}

impl<'a, X: Executor + ?Sized> RollbackGuard<'a, X> {
    fn new(db: &'a X) -> Self {
        Self { db, armed: true }
    }

    /// Roll back now and disarm. Failures are logged, never returned.
    fn rollback(mut self, context: &'static str) {
        self.armed = false;
        if let Err(rollback_err) = self.db.rollback() {
            tracing::error!(target: "fluentsql.tx", error = %rollback_err, "{context}");
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<X: Executor + ?Sized> Drop for RollbackGuard<'_, X> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(target: "fluentsql.tx", "transaction body panicked, rolling back");
        if let Err(rollback_err) = self.db.rollback() {
            tracing::error!(target: "fluentsql.tx", error = %rollback_err, "rollback failed");
        }
    }
}

/// Run `body` inside a transaction on `db`.
///
/// - Begins a transaction.
/// - Commits when `body` returns `Ok`.
/// - Rolls back when `body` returns `Err`, then returns that same error.
///   A failing rollback is logged and does not replace the original error.
/// - Rolls back when `body` panics, then lets the panic continue.
///
/// If the commit itself fails, a rollback is attempted and the commit error
/// is returned.
pub fn transaction<X, T, E, F>(db: &X, body: F) -> Result<T, E>
where
    X: Executor + ?Sized,
    F: FnOnce(&X) -> Result<T, E>,
    E: From<SqlError>,
{
    db.begin()?;
    let guard = RollbackGuard::new(db);
    match body(db) {
        Ok(value) => match db.commit() {
            Ok(()) => {
                guard.disarm();
                Ok(value)
            }
            Err(commit_err) => {
                guard.rollback("rollback after failed commit also failed");
                Err(commit_err.into())
            }
        },
        Err(error) => {
            guard.rollback("rollback failed");
            Err(error)
        }
    }
}
