//! Fluent query builder.
//!
//! A [`QueryBuilder`] collects table, columns, joins, conditions, grouping,
//! ordering and paging through consuming chain calls, then compiles them into
//! SQL text plus named bindings. Values never appear in the SQL text.
//!
//! # Usage
//!
//! ```ignore
//! use fluentsql::prelude::*;
//!
//! let rows = QueryBuilder::table("posts p")
//!     .select(["p.id", "p.title", "u.name AS author"])
//!     .left_join("users u", "u.id = p.user_id")
//!     .where_("p.status", "published")
//!     .where_nested(|q| {
//!         q.where_cmp("p.title", Op::Like, "%rust%")
//!             .or_where(|q| q.where_("p.pinned", true))
//!     })
//!     .order_by_desc("p.created_at")
//!     .limit(20)
//!     .get(&db)?;
//! ```

mod compile;
mod exec;
mod nested;
mod where_clause;

pub use compile::CompiledQuery;
pub use exec::Page;
pub use nested::Nested;
pub use where_clause::WhereBuilder;

use crate::binding::Bindings;
use crate::condition::ConditionNode;
use crate::error::{SqlError, SqlResult};
use crate::ident::{self, quote};
use crate::value::Value;

/// JOIN flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    target: String,
    on: String,
}

/// Chainable SELECT/INSERT/UPDATE/DELETE builder for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    /// Target table
    table: String,
    /// Optional alias (`"users u"`)
    alias: Option<String>,
    /// Output columns (default `["*"]`)
    columns: Vec<String>,
    distinct: bool,
    joins: Vec<Join>,
    /// WHERE condition sequence
    wheres: Vec<ConditionNode>,
    /// Values referenced by WHERE conditions
    bindings: Bindings,
    /// Quoted GROUP BY columns
    groups: Vec<String>,
    /// HAVING fragments (ANDed)
    havings: Vec<String>,
    /// Caller-named HAVING values, sent with SELECT only
    having_bindings: Bindings,
    /// ORDER BY fragments
    orders: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl QueryBuilder {
    /// Start a builder on `table`. `"table alias"` sets an alias.
    pub fn table(table: &str) -> Self {
        let (name, alias) = ident::split_alias(table);
        Self {
            table: name.to_string(),
            alias: alias.map(str::to_string),
            columns: vec!["*".to_string()],
            distinct: false,
            joins: Vec::new(),
            wheres: Vec::new(),
            bindings: Bindings::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            having_bindings: Bindings::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ==================== SELECT columns ====================

    /// Choose output columns. The first call replaces the default `*`;
    /// later calls append.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into);
        if self.columns.len() == 1 && self.columns[0] == "*" {
            self.columns = columns.collect();
        } else {
            self.columns.extend(columns);
        }
        if self.columns.is_empty() {
            self.columns.push("*".to_string());
        }
        self
    }

    /// SELECT DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== JOIN ====================

    /// Add INNER JOIN. `target` may be `"table"`, `"table alias"` or a
    /// parenthesized subquery; `on` is raw SQL.
    pub fn inner_join(mut self, target: &str, on: &str) -> Self {
        self.push_join(JoinKind::Inner, target, on);
        self
    }

    /// Alias for `inner_join`.
    pub fn join(self, target: &str, on: &str) -> Self {
        self.inner_join(target, on)
    }

    /// Add LEFT JOIN.
    pub fn left_join(mut self, target: &str, on: &str) -> Self {
        self.push_join(JoinKind::Left, target, on);
        self
    }

    /// Add RIGHT JOIN.
    pub fn right_join(mut self, target: &str, on: &str) -> Self {
        self.push_join(JoinKind::Right, target, on);
        self
    }

    fn push_join(&mut self, kind: JoinKind, target: &str, on: &str) {
        self.joins.push(Join {
            kind,
            target: target.to_string(),
            on: on.to_string(),
        });
    }

    // ==================== Grouping ====================

    /// Add GROUP BY columns.
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.groups
            .extend(columns.into_iter().map(|c| quote(c.as_ref())));
        self
    }

    /// Add a raw HAVING fragment with caller-named bindings.
    ///
    /// ```ignore
    /// qb.having("post_count > :min", &[("min", 0.into())])
    /// ```
    pub fn having(mut self, condition: &str, bindings: &[(&str, Value)]) -> Self {
        self.havings.push(condition.to_string());
        self.having_bindings.merge(bindings);
        self
    }

    // ==================== Ordering & paging ====================

    /// Add ORDER BY column with direction `ASC` or `DESC` (any case).
    pub fn order_by(mut self, column: &str, direction: &str) -> SqlResult<Self> {
        let dir = direction.trim().to_ascii_uppercase();
        if dir != "ASC" && dir != "DESC" {
            return Err(SqlError::InvalidDirection(direction.to_string()));
        }
        self.orders.push(format!("{} {}", quote(column), dir));
        Ok(self)
    }

    /// Add ORDER BY column ASC.
    pub fn order_by_asc(mut self, column: &str) -> Self {
        self.orders.push(format!("{} ASC", quote(column)));
        self
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.orders.push(format!("{} DESC", quote(column)));
        self
    }

    /// Add a raw ORDER BY expression.
    pub fn order_by_raw(mut self, expression: &str) -> Self {
        self.orders.push(expression.to_string());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    // ==================== Introspection ====================

    /// Table name without alias.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// WHERE condition sequence as built so far.
    pub fn conditions(&self) -> &[ConditionNode] {
        &self.wheres
    }

    /// WHERE bindings collected so far.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// HAVING bindings, kept apart because UPDATE and DELETE never render
    /// HAVING.
    pub fn having_bindings(&self) -> &Bindings {
        &self.having_bindings
    }

    fn table_expression(&self) -> String {
        match self.alias {
            Some(ref alias) => format!("{} {}", quote(&self.table), alias),
            None => quote(&self.table),
        }
    }
}

impl WhereBuilder for QueryBuilder {
    fn parts_mut(&mut self) -> (&mut Vec<ConditionNode>, &mut Bindings) {
        (&mut self.wheres, &mut self.bindings)
    }
}
