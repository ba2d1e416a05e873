//! SQLite driver (rusqlite).
//!
//! SQLite understands both conventions the builder emits: backtick-quoted
//! identifiers and `:name` placeholders.

use crate::binding::Params;
use crate::config::SqliteConfig;
use crate::driver::{Connection, Connector, Execution};
use crate::error::{SqlError, SqlResult};
use crate::row::Row;
use crate::value::Value;
use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{Statement, ToSql};
use std::sync::Arc;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Value::Integer(v) => ToSqlOutput::Owned(SqliteValue::Integer(*v)),
            Value::Real(v) => ToSqlOutput::Owned(SqliteValue::Real(*v)),
            Value::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Bool(v) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*v))),
            Value::Blob(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => Value::Blob(v.to_vec()),
        }
    }
}

/// Opens SQLite connections from a [`SqliteConfig`].
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    config: SqliteConfig,
}

impl SqliteConnector {
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }

    /// Connector for a private in-memory database.
    pub fn in_memory() -> Self {
        Self::new(SqliteConfig::in_memory())
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

impl Connector for SqliteConnector {
    type Connection = SqliteConnection;

    fn connect(&self) -> SqlResult<SqliteConnection> {
        let config = &self.config;
        let fail = |err: rusqlite::Error| {
            SqlError::Connection(format!("failed to open '{}': {err}", config.database))
        };

        let conn = if config.is_in_memory() {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&config.database)
        }
        .map_err(fail)?;

        if let Some(timeout) = config.busy_timeout {
            conn.busy_timeout(timeout).map_err(fail)?;
        }
        if config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON").map_err(fail)?;
        }
        if let Some(ref init) = config.init_sql {
            conn.execute_batch(init).map_err(fail)?;
        }

        Ok(SqliteConnection { conn })
    }
}

/// An open SQLite handle.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Wrap an already-open rusqlite connection.
    pub fn from_rusqlite(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Borrow the underlying rusqlite connection.
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

/// Accept `name`, `:name`, `@name` and `$name` keys.
fn placeholder_for(name: &str) -> String {
    if name.starts_with([':', '@', '$']) {
        name.to_string()
    } else {
        format!(":{name}")
    }
}

fn prepare<'c>(
    conn: &'c rusqlite::Connection,
    sql: &str,
    params: &Params,
) -> SqlResult<Statement<'c>> {
    let mut stmt = conn.prepare(sql)?;
    match params {
        Params::Named(entries) => {
            for (name, value) in entries {
                let placeholder = placeholder_for(name);
                let index = stmt
                    .parameter_index(&placeholder)?
                    .ok_or(rusqlite::Error::InvalidParameterName(placeholder))?;
                stmt.raw_bind_parameter(index, value)?;
            }
        }
        Params::Positional(values) => {
            for (i, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(i + 1, value)?;
            }
        }
    }
    Ok(stmt)
}

impl Connection for SqliteConnection {
    fn query(&mut self, sql: &str, params: &Params) -> SqlResult<Vec<Row>> {
        let mut stmt = prepare(&self.conn, sql, params)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .into();

        let mut rows = stmt.raw_query();
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(Value::from(row.get_ref(i)?));
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(out)
    }

    fn execute(&mut self, sql: &str, params: &Params) -> SqlResult<Execution> {
        let mut stmt = prepare(&self.conn, sql, params)?;
        let affected = stmt.raw_execute()?;
        Ok(Execution {
            affected_rows: affected as u64,
            last_insert_id: Some(self.conn.last_insert_rowid()),
        })
    }

    fn batch(&mut self, sql: &str) -> SqlResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}
