use super::QueryBuilder;
use super::compile::page_window;
use crate::error::{SqlError, SqlResult};
use crate::executor::Executor;
use crate::row::Row;
use crate::value::Value;
use serde::Serialize;

/// One page of results plus the numbers needed to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub data: Vec<Row>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
    /// 1-based position of the first row on this page, 0 when empty.
    pub from: u64,
    /// 1-based position of the last row on this page, 0 when empty.
    pub to: u64,
}

impl Page {
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }
}

impl QueryBuilder {
    /// Run the SELECT and return every row.
    pub fn get<X: Executor + ?Sized>(&self, db: &X) -> SqlResult<Vec<Row>> {
        let q = self.compile_select();
        db.query(&q.sql, &q.params)
    }

    /// Run the SELECT with `LIMIT 1`.
    pub fn first<X: Executor + ?Sized>(&self, db: &X) -> SqlResult<Option<Row>> {
        let q = self.compile_first();
        Ok(db.query(&q.sql, &q.params)?.into_iter().next())
    }

    /// First row's value for `column`, or `None` when nothing matches.
    pub fn value<X: Executor + ?Sized>(&self, db: &X, column: &str) -> SqlResult<Option<Value>> {
        let q = self.compile_value(column);
        let row = db.query(&q.sql, &q.params)?.into_iter().next();
        Ok(row.and_then(|r| r.into_values().into_iter().next()))
    }

    /// `COUNT(*)` of the current query.
    pub fn count<X: Executor + ?Sized>(&self, db: &X) -> SqlResult<u64> {
        self.count_column(db, "*")
    }

    /// `COUNT(column)` of the current query (non-null values of `column`).
    pub fn count_column<X: Executor + ?Sized>(&self, db: &X, column: &str) -> SqlResult<u64> {
        let q = self.compile_count(column);
        let row = db.query(&q.sql, &q.params)?.into_iter().next();
        match row {
            Some(row) => {
                let n: i64 = row.try_get("aggregate")?;
                Ok(n.max(0) as u64)
            }
            None => Ok(0),
        }
    }

    /// Run a count and one page of the SELECT.
    ///
    /// `per_page` and `page` are clamped to at least 1.
    pub fn paginate<X: Executor + ?Sized>(
        &self,
        db: &X,
        per_page: u64,
        page: u64,
    ) -> SqlResult<Page> {
        let (per_page, page, offset) = page_window(per_page, page);
        let total = self.count(db)?;

        let q = self.compile_page(per_page, page);
        let data = db.query(&q.sql, &q.params)?;

        let (from, to) = if data.is_empty() {
            (0, 0)
        } else {
            (offset + 1, offset + data.len() as u64)
        };
        Ok(Page {
            total,
            per_page,
            current_page: page,
            last_page: total.div_ceil(per_page),
            from,
            to,
            data,
        })
    }

    /// Insert one row and return the id the driver reports for it.
    pub fn insert<X: Executor + ?Sized>(&self, db: &X, data: &[(&str, Value)]) -> SqlResult<i64> {
        let q = self.compile_insert(data)?;
        db.execute(&q.sql, &q.params)?
            .last_insert_id
            .ok_or_else(|| SqlError::Other("driver reported no insert id".to_string()))
    }

    /// Update matching rows and return the affected count.
    pub fn update<X: Executor + ?Sized>(&self, db: &X, data: &[(&str, Value)]) -> SqlResult<u64> {
        let q = self.compile_update(data)?;
        Ok(db.execute(&q.sql, &q.params)?.affected_rows)
    }

    /// Add `amount` to `column` on matching rows.
    pub fn increment<X: Executor + ?Sized>(
        &self,
        db: &X,
        column: &str,
        amount: impl Into<Value>,
    ) -> SqlResult<u64> {
        let q = self.compile_increment(column, amount);
        Ok(db.execute(&q.sql, &q.params)?.affected_rows)
    }

    /// Subtract `amount` from `column` on matching rows.
    pub fn decrement<X: Executor + ?Sized>(
        &self,
        db: &X,
        column: &str,
        amount: impl Into<Value>,
    ) -> SqlResult<u64> {
        let q = self.compile_decrement(column, amount);
        Ok(db.execute(&q.sql, &q.params)?.affected_rows)
    }

    /// Delete matching rows and return the affected count.
    pub fn delete<X: Executor + ?Sized>(&self, db: &X) -> SqlResult<u64> {
        let q = self.compile_delete();
        Ok(db.execute(&q.sql, &q.params)?.affected_rows)
    }
}
