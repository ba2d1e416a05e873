//! Statement compilation.
//!
//! Terminals never mutate builder state: count/first/value/paginate pass
//! their overrides (columns, ordering, limit, offset) into [`Shape`] instead
//! of editing the builder and restoring it afterwards.

use super::QueryBuilder;
use crate::binding::{Bindings, Params, placeholder, prefix};
use crate::condition::compile_where;
use crate::error::{SqlError, SqlResult};
use crate::ident::{quote, quote_table_ref};
use crate::value::Value;
use std::fmt;

/// SQL text plus the parameters it references.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Params,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>, params: impl Into<Params>) -> Self {
        Self {
            sql: sql.into(),
            params: params.into(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Per-call view of the overridable SELECT parts.
struct Shape<'a> {
    columns: &'a [String],
    orders: &'a [String],
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Clamp `(per_page, page)` to at least 1 and return `(limit, offset)`.
pub(crate) fn page_window(per_page: u64, page: u64) -> (u64, u64, u64) {
    let per_page = per_page.max(1);
    let page = page.max(1);
    (per_page, page, (page - 1).saturating_mul(per_page))
}

impl QueryBuilder {
    fn shape(&self) -> Shape<'_> {
        Shape {
            columns: &self.columns,
            orders: &self.orders,
            limit: self.limit,
            offset: self.offset,
        }
    }

    fn render_select(&self, shape: Shape<'_>) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        let columns: Vec<String> = shape.columns.iter().map(|c| quote(c)).collect();
        sql.push_str(&columns.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(&self.table_expression());

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.as_sql());
            sql.push(' ');
            sql.push_str(&quote_table_ref(&join.target));
            sql.push_str(" ON ");
            sql.push_str(&join.on);
        }

        sql.push_str(&compile_where(&self.wheres));

        if !self.groups.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.groups.join(", "));
        }
        if !self.havings.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.havings.join(" AND "));
        }
        if !shape.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&shape.orders.join(", "));
        }
        match (shape.limit, shape.offset) {
            (Some(limit), offset) => {
                sql.push_str(&format!(" LIMIT {limit}"));
                if let Some(offset) = offset {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
            // SQLite only accepts OFFSET after a LIMIT.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
        sql
    }

    /// Attach WHERE and HAVING bindings to a SELECT.
    fn with_bindings(&self, sql: String) -> CompiledQuery {
        if self.having_bindings.is_empty() {
            return CompiledQuery::new(sql, &self.bindings);
        }
        let mut bindings = self.bindings.clone();
        for (name, value) in self.having_bindings.iter() {
            bindings.insert(name, value.clone());
        }
        CompiledQuery::new(sql, bindings)
    }

    /// Compile the SELECT statement as configured.
    pub fn compile_select(&self) -> CompiledQuery {
        self.with_bindings(self.render_select(self.shape()))
    }

    /// SELECT text only.
    pub fn to_sql(&self) -> String {
        self.render_select(self.shape())
    }

    /// SELECT with `LIMIT 1`.
    pub fn compile_first(&self) -> CompiledQuery {
        let shape = Shape {
            limit: Some(1),
            ..self.shape()
        };
        self.with_bindings(self.render_select(shape))
    }

    /// SELECT of a single column with `LIMIT 1`.
    pub fn compile_value(&self, column: &str) -> CompiledQuery {
        let columns = [column.to_string()];
        let shape = Shape {
            columns: &columns,
            limit: Some(1),
            ..self.shape()
        };
        self.with_bindings(self.render_select(shape))
    }

    /// Row count of the current query, returned in the `aggregate` column.
    ///
    /// Grouped queries are wrapped as a subquery so the result counts groups.
    pub fn compile_count(&self, column: &str) -> CompiledQuery {
        if !self.groups.is_empty() {
            let inner = self.render_select(Shape {
                orders: &[],
                limit: None,
                offset: None,
                ..self.shape()
            });
            return self.with_bindings(format!(
                "SELECT COUNT(*) AS aggregate FROM ({inner}) AS subquery"
            ));
        }
        let columns = [format!("COUNT({}) AS aggregate", quote(column))];
        self.with_bindings(self.render_select(Shape {
            columns: &columns,
            orders: &[],
            limit: None,
            offset: None,
        }))
    }

    /// SELECT for one page (`per_page` and `page` are clamped to at least 1).
    pub fn compile_page(&self, per_page: u64, page: u64) -> CompiledQuery {
        let (limit, _, offset) = page_window(per_page, page);
        self.with_bindings(self.render_select(Shape {
            limit: Some(limit),
            offset: Some(offset),
            ..self.shape()
        }))
    }

    /// `INSERT INTO table (cols) VALUES (:i..)`.
    pub fn compile_insert(&self, data: &[(&str, Value)]) -> SqlResult<CompiledQuery> {
        if data.is_empty() {
            return Err(SqlError::EmptyInput("insert"));
        }
        let mut bindings = self.bindings.continuation();
        let mut columns = Vec::with_capacity(data.len());
        let mut placeholders = Vec::with_capacity(data.len());
        for (column, value) in data {
            columns.push(quote(column));
            placeholders.push(placeholder(&bindings.allocate(prefix::INSERT, value.clone())));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(&self.table),
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok(CompiledQuery::new(sql, bindings))
    }

    /// `UPDATE table SET col = :u.. [WHERE ...]`.
    ///
    /// SET names continue the builder's counter, so they never collide with
    /// WHERE names.
    pub fn compile_update(&self, data: &[(&str, Value)]) -> SqlResult<CompiledQuery> {
        if data.is_empty() {
            return Err(SqlError::EmptyInput("update"));
        }
        let mut bindings = self.bindings.clone();
        let sets: Vec<String> = data
            .iter()
            .map(|(column, value)| {
                let name = bindings.allocate(prefix::UPDATE, value.clone());
                format!("{} = {}", quote(column), placeholder(&name))
            })
            .collect();
        Ok(self.render_update(&sets.join(", "), bindings))
    }

    /// `UPDATE table SET col = col + :u.. [WHERE ...]`.
    pub fn compile_increment(&self, column: &str, amount: impl Into<Value>) -> CompiledQuery {
        self.compile_step(column, '+', amount.into())
    }

    /// `UPDATE table SET col = col - :u.. [WHERE ...]`.
    pub fn compile_decrement(&self, column: &str, amount: impl Into<Value>) -> CompiledQuery {
        self.compile_step(column, '-', amount.into())
    }

    fn compile_step(&self, column: &str, sign: char, amount: Value) -> CompiledQuery {
        let mut bindings = self.bindings.clone();
        let name = bindings.allocate(prefix::UPDATE, amount);
        let column = quote(column);
        let set = format!("{column} = {column} {sign} {}", placeholder(&name));
        self.render_update(&set, bindings)
    }

    fn render_update(&self, sets: &str, bindings: Bindings) -> CompiledQuery {
        let sql = format!(
            "UPDATE {} SET {}{}",
            self.table_expression(),
            sets,
            compile_where(&self.wheres)
        );
        CompiledQuery::new(sql, bindings)
    }

    /// `DELETE FROM table [WHERE ...]`.
    pub fn compile_delete(&self) -> CompiledQuery {
        let sql = format!(
            "DELETE FROM {}{}",
            self.table_expression(),
            compile_where(&self.wheres)
        );
        CompiledQuery::new(sql, &self.bindings)
    }
}
