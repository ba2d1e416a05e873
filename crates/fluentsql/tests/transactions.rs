#![cfg(feature = "sqlite")]

mod common;

use common::{seed_users, setup};
use fluentsql::prelude::*;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, PartialEq)]
enum TransferError {
    Insufficient { available: i64 },
    Db(String),
}

impl From<SqlError> for TransferError {
    fn from(err: SqlError) -> Self {
        TransferError::Db(err.to_string())
    }
}

fn votes_of<X: Executor + ?Sized>(db: &X, id: i64) -> SqlResult<i64> {
    let value = QueryBuilder::table("users")
        .where_("id", id)
        .value(db, "votes")?
        .unwrap_or(Value::Integer(0));
    Ok(value.as_i64().unwrap_or(0))
}

fn transfer<X: Executor + ?Sized>(db: &X, from: i64, to: i64, amount: i64) -> Result<(), TransferError> {
    QueryBuilder::table("users")
        .where_("id", from)
        .decrement(db, "votes", amount)?;
    QueryBuilder::table("users")
        .where_("id", to)
        .increment(db, "votes", amount)?;
    let available = votes_of(db, from)?;
    if available < 0 {
        return Err(TransferError::Insufficient {
            available: available + amount,
        });
    }
    Ok(())
}

#[test]
fn commit_keeps_writes() {
    let (db, log) = setup();
    seed_users(&db, 2);
    db.table("users").where_("id", 1).update(&db, &[("votes", 10.into())]).unwrap();
    log.clear();

    db.transaction(|tx| transfer(tx, 1, 2, 4)).unwrap();

    let entries = log.entries();
    assert_eq!(entries.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(entries.last().map(String::as_str), Some("COMMIT"));
    assert_eq!(votes_of(&db, 1).unwrap(), 6);
    assert_eq!(votes_of(&db, 2).unwrap(), 4);
}

#[test]
fn rollback_leaves_no_partial_writes() {
    let (db, log) = setup();
    seed_users(&db, 2);
    db.table("users").where_("id", 1).update(&db, &[("votes", 3.into())]).unwrap();
    log.clear();

    let err = db.transaction(|tx| transfer(tx, 1, 2, 5)).unwrap_err();

    // The caller's own error comes back untouched.
    assert_eq!(err, TransferError::Insufficient { available: 3 });
    assert_eq!(log.entries().last().map(String::as_str), Some("ROLLBACK"));
    assert_eq!(votes_of(&db, 1).unwrap(), 3);
    assert_eq!(votes_of(&db, 2).unwrap(), 0);
}

#[test]
fn panicking_body_rolls_back() {
    let (db, log) = setup();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _: SqlResult<()> = db.transaction(|tx| {
            tx.table("users").insert(tx, &[("name", "half".into())])?;
            panic!("body gave up");
        });
    }));
    assert!(outcome.is_err());

    let entries = log.entries();
    assert_eq!(entries.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(entries.last().map(String::as_str), Some("ROLLBACK"));
    assert_eq!(db.table("users").count(&db).unwrap(), 0);

    // The connection is usable for the next transaction.
    let id = db
        .transaction(|tx| tx.table("users").insert(tx, &[("name", "after".into())]))
        .unwrap();
    assert_eq!(db.table("users").where_("id", id).count(&db).unwrap(), 1);
}

#[test]
fn rollback_on_driver_error() {
    let (db, _) = setup();
    let result: SqlResult<()> = db.transaction(|tx| {
        tx.table("users").insert(tx, &[("name", "kept?".into())])?;
        tx.table("nope").insert(tx, &[("x", 1.into())])?;
        Ok(())
    });
    assert!(result.unwrap_err().is_execution());
    assert_eq!(db.table("users").count(&db).unwrap(), 0);
}

#[test]
fn anyhow_errors_round_trip() {
    let (db, _) = setup();
    let err = db
        .transaction(|tx| -> anyhow::Result<()> {
            tx.table("users").insert(tx, &[("name", "temp".into())])?;
            anyhow::bail!("stop here")
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "stop here");
    assert_eq!(db.table("users").count(&db).unwrap(), 0);
}

#[test]
fn free_function_works_on_any_executor() {
    let (db, _) = setup();
    let exec: &dyn Executor = &db;
    let id = fluentsql::transaction(exec, |tx| {
        QueryBuilder::table("users").insert(tx, &[("name", "dyn".into())])
    })
    .unwrap();
    assert_eq!(id, 1);
    assert_eq!(db.table("users").count(&db).unwrap(), 1);
}
