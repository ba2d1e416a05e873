use super::*;
use crate::builder::WhereBuilder;
use crate::hook::StatementKind;
use crate::value::Value;
use std::sync::atomic::AtomicUsize;

#[derive(Debug, Default, Clone)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(&self, sql: &str) {
        self.0.lock().unwrap().push(sql.to_string());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Debug, Default)]
struct FakeConnector {
    log: Log,
    attempts: AtomicUsize,
    failures_left: AtomicUsize,
    fail_rollback: bool,
}

impl FakeConnector {
    fn failing(times: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            ..Self::default()
        }
    }
}

struct FakeConnection {
    log: Log,
    fail_rollback: bool,
}

impl Connector for FakeConnector {
    type Connection = FakeConnection;

    fn connect(&self) -> SqlResult<FakeConnection> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(SqlError::Connection("refused".to_string()));
        }
        Ok(FakeConnection {
            log: self.log.clone(),
            fail_rollback: self.fail_rollback,
        })
    }
}

impl Connection for FakeConnection {
    fn query(&mut self, sql: &str, _params: &Params) -> SqlResult<Vec<Row>> {
        self.log.push(sql);
        Ok(vec![
            Row::from_pairs([("n", Value::Integer(1))]),
            Row::from_pairs([("n", Value::Integer(2))]),
        ])
    }

    fn execute(&mut self, sql: &str, _params: &Params) -> SqlResult<Execution> {
        self.log.push(sql);
        Ok(Execution {
            affected_rows: 3,
            last_insert_id: Some(42),
        })
    }

    fn batch(&mut self, sql: &str) -> SqlResult<()> {
        self.log.push(sql);
        if self.fail_rollback && sql == "ROLLBACK" {
            return Err(SqlError::execution(std::io::Error::other("rollback failed")));
        }
        Ok(())
    }
}

#[derive(Debug)]
enum AppError {
    Sql(SqlError),
    Rejected(&'static str),
}

impl From<SqlError> for AppError {
    fn from(err: SqlError) -> Self {
        AppError::Sql(err)
    }
}

#[test]
fn test_connects_lazily_and_once() {
    let db = Manager::new(FakeConnector::default());
    assert_eq!(db.state(), ConnectionState::Unconnected);
    assert_eq!(db.connector().attempts.load(Ordering::SeqCst), 0);

    db.query("SELECT 1", &Params::none()).unwrap();
    db.execute("DELETE FROM t", &Params::none()).unwrap();

    assert_eq!(db.state(), ConnectionState::Connected);
    assert_eq!(db.connector().attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_connect_is_retried() {
    let db = Manager::new(FakeConnector::failing(1));

    let err = db.query("SELECT 1", &Params::none()).unwrap_err();
    assert!(err.is_connection());
    assert_eq!(db.state(), ConnectionState::Failed);

    db.query("SELECT 1", &Params::none()).unwrap();
    assert_eq!(db.state(), ConnectionState::Connected);
    assert_eq!(db.connector().attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_explicit_connect() {
    let db = Manager::new(FakeConnector::default());
    db.connect().unwrap();
    assert_eq!(db.state(), ConnectionState::Connected);
    assert!(db.connector().log.entries().is_empty());
}

#[test]
fn test_raw_helpers() {
    let db = Manager::new(FakeConnector::default());
    assert_eq!(db.select("SELECT n", Params::none()).unwrap().len(), 2);
    let first = db.select_one("SELECT n", Params::none()).unwrap().unwrap();
    assert_eq!(first.get("n"), Some(&Value::Integer(1)));
    assert_eq!(db.statement("UPDATE t SET n = 1", Params::none()).unwrap(), 3);
}

#[test]
fn test_transaction_commits_on_ok() {
    let db = Manager::new(FakeConnector::default());
    let id = db
        .transaction(|tx| {
            let exec = tx.execute("INSERT INTO t DEFAULT VALUES", &Params::none())?;
            Ok::<_, SqlError>(exec.last_insert_id)
        })
        .unwrap();
    assert_eq!(id, Some(42));
    assert_eq!(
        db.connector().log.entries(),
        ["BEGIN", "INSERT INTO t DEFAULT VALUES", "COMMIT"]
    );
}

#[test]
fn test_transaction_rolls_back_and_returns_original_error() {
    let db = Manager::new(FakeConnector::default());
    let result: Result<(), AppError> = db.transaction(|tx| {
        tx.execute("INSERT INTO t DEFAULT VALUES", &Params::none())?;
        Err(AppError::Rejected("quota exceeded"))
    });
    assert!(matches!(result, Err(AppError::Rejected("quota exceeded"))));
    assert_eq!(
        db.connector().log.entries(),
        ["BEGIN", "INSERT INTO t DEFAULT VALUES", "ROLLBACK"]
    );
}

#[test]
fn test_failed_rollback_keeps_original_error() {
    let connector = FakeConnector {
        fail_rollback: true,
        ..FakeConnector::default()
    };
    let db = Manager::new(connector);
    let result: Result<(), AppError> = db.transaction(|_| Err(AppError::Rejected("boom")));
    assert!(matches!(result, Err(AppError::Rejected("boom"))));
}

#[test]
fn test_transaction_begin_failure_surfaces_as_sql_error() {
    let db = Manager::new(FakeConnector::failing(1));
    let mut ran = false;
    let result: Result<(), AppError> = db.transaction(|_| {
        ran = true;
        Ok(())
    });
    assert!(matches!(result, Err(AppError::Sql(ref e)) if e.is_connection()));
    assert!(!ran);
}

#[derive(Default)]
struct Capture(Mutex<Vec<(String, StatementKind, Params)>>);

impl QueryHook for Arc<Capture> {
    fn before_query(&self, ctx: &QueryContext<'_>) {
        self.0
            .lock()
            .unwrap()
            .push((ctx.sql.to_string(), ctx.kind, ctx.params.clone()));
    }
}

#[test]
fn test_hook_sees_sql_and_bindings() {
    let db = Manager::new(FakeConnector::default());
    let capture = Arc::new(Capture::default());
    db.set_hook(Arc::clone(&capture));

    let qb = db.table("users").where_("id", 7);
    qb.get(&db).unwrap();
    db.transaction(|_| Ok::<_, SqlError>(())).unwrap();

    let seen = capture.0.lock().unwrap().clone();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].0, "SELECT * FROM `users` WHERE `id` = :w1");
    assert_eq!(seen[0].1, StatementKind::Select);
    assert_eq!(seen[0].2.get("w1"), Some(&Value::Integer(7)));
    assert_eq!(seen[1].1, StatementKind::Transaction);

    db.clear_hook();
    db.query("SELECT 2", &Params::none()).unwrap();
    assert_eq!(capture.0.lock().unwrap().len(), 3);
}

#[test]
fn test_debug_mode_does_not_change_results() {
    let db = Manager::with_config(FakeConnector::default(), ManagerConfig::new().debug(true));
    assert!(db.config().debug);
    let rows = db.table("t").get(&db).unwrap();
    assert_eq!(rows.len(), 2);
    db.set_debug(false);
    assert_eq!(db.table("t").get(&db).unwrap().len(), 2);
}
