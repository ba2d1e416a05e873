#![allow(dead_code)]

use fluentsql::driver::{Connection, Connector, Execution};
use fluentsql::{Executor, Manager, Params, Row, SqlResult, SqliteConnection, SqliteConnector, Value};
use std::sync::{Arc, Mutex};

/// Every SQL string sent to the database, in order.
#[derive(Debug, Default, Clone)]
pub struct StatementLog(Arc<Mutex<Vec<String>>>);

impl StatementLog {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    fn push(&self, sql: &str) {
        self.0.lock().unwrap().push(sql.to_string());
    }
}

/// In-memory SQLite that records what it runs.
#[derive(Debug)]
pub struct RecordingConnector {
    inner: SqliteConnector,
    pub log: StatementLog,
}

pub struct RecordingConnection {
    inner: SqliteConnection,
    log: StatementLog,
}

impl Connector for RecordingConnector {
    type Connection = RecordingConnection;

    fn connect(&self) -> SqlResult<RecordingConnection> {
        Ok(RecordingConnection {
            inner: self.inner.connect()?,
            log: self.log.clone(),
        })
    }
}

impl Connection for RecordingConnection {
    fn query(&mut self, sql: &str, params: &Params) -> SqlResult<Vec<Row>> {
        self.log.push(sql);
        self.inner.query(sql, params)
    }

    fn execute(&mut self, sql: &str, params: &Params) -> SqlResult<Execution> {
        self.log.push(sql);
        self.inner.execute(sql, params)
    }

    fn batch(&mut self, sql: &str) -> SqlResult<()> {
        self.log.push(sql);
        self.inner.batch(sql)
    }
}

const SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT,
        role TEXT NOT NULL DEFAULT 'member',
        votes INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE posts (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id),
        title TEXT NOT NULL,
        status TEXT NOT NULL
    );
";

/// A manager on a fresh in-memory database with the test schema.
pub fn setup() -> (Manager<RecordingConnector>, StatementLog) {
    let log = StatementLog::default();
    let connector = RecordingConnector {
        inner: SqliteConnector::in_memory(),
        log: log.clone(),
    };
    let db = Manager::new(connector);
    for stmt in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        db.statement(stmt, Params::none()).unwrap();
    }
    log.clear();
    (db, log)
}

/// Insert `n` users named `user01`.. with alternating roles.
pub fn seed_users(db: &Manager<RecordingConnector>, n: usize) {
    for i in 1..=n {
        let role = if i % 2 == 0 { "admin" } else { "member" };
        db.statement(
            "INSERT INTO users (name, email, role) VALUES (?, ?, ?)",
            Params::positional([
                Value::from(format!("user{i:02}")),
                Value::from(format!("user{i:02}@example.com")),
                Value::from(role),
            ]),
        )
        .unwrap();
    }
}
