//! Transaction example for fluentsql
//!
//! Run with: cargo run --example transaction -p fluentsql
//!
//! Demonstrates `Manager::transaction`: the body commits when it returns `Ok`
//! and rolls back when it returns `Err`, handing the caller's own error back.

use fluentsql::prelude::*;

#[derive(Debug)]
enum TransferError {
    Insufficient { balance: i64, amount: i64 },
    Db(SqlError),
}

impl From<SqlError> for TransferError {
    fn from(err: SqlError) -> Self {
        TransferError::Db(err)
    }
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::Insufficient { balance, amount } => {
                write!(f, "insufficient balance: {balance} < {amount}")
            }
            TransferError::Db(err) => write!(f, "{err}"),
        }
    }
}

fn balance<X: Executor + ?Sized>(db: &X, id: i64) -> SqlResult<i64> {
    let value = QueryBuilder::table("accounts")
        .where_("id", id)
        .value(db, "balance")?;
    Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
}

/// Transfer money between accounts. Works with anything that can execute.
fn transfer<X: Executor + ?Sized>(
    db: &X,
    from_id: i64,
    to_id: i64,
    amount: i64,
) -> Result<(), TransferError> {
    let available = balance(db, from_id)?;
    if available < amount {
        return Err(TransferError::Insufficient {
            balance: available,
            amount,
        });
    }

    QueryBuilder::table("accounts")
        .where_("id", from_id)
        .decrement(db, "balance", amount)?;
    QueryBuilder::table("accounts")
        .where_("id", to_id)
        .increment(db, "balance", amount)?;

    Ok(())
}

fn print_accounts(db: &Manager<SqliteConnector>) -> SqlResult<()> {
    for row in db.table("accounts").order_by_asc("id").get(db)? {
        println!(
            "  {}: {}",
            row.try_get::<String>("name")?,
            row.try_get::<i64>("balance")?
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let db = Manager::new(SqliteConnector::in_memory());
    db.statement(
        "CREATE TABLE accounts (id INTEGER PRIMARY KEY, name TEXT NOT NULL, balance INTEGER NOT NULL)",
        Params::none(),
    )?;

    let alice = db
        .table("accounts")
        .insert(&db, &[("name", "alice".into()), ("balance", 100.into())])?;
    let bob = db
        .table("accounts")
        .insert(&db, &[("name", "bob".into()), ("balance", 20.into())])?;

    println!("Initial balances:");
    print_accounts(&db)?;

    db.transaction(|tx| transfer(tx, alice, bob, 30))
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("\nAfter transferring 30 from alice to bob:");
    print_accounts(&db)?;

    match db.transaction(|tx| transfer(tx, bob, alice, 500)) {
        Ok(()) => println!("\nUnexpected success"),
        Err(e) => println!("\nTransfer rolled back: {e}"),
    }
    print_accounts(&db)?;

    Ok(())
}
