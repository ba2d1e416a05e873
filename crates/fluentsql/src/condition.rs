//! Condition nodes and the WHERE compiler.
//!
//! Chained `where_*` / `or_where*` calls append [`ConditionNode`]s to an ordered
//! sequence. [`compile_where`] turns that sequence into a single clause:
//!
//! - With only AND connectives the texts are joined with ` AND `.
//! - Otherwise consecutive AND nodes form one group (parenthesized when it
//!   has more than one member) and every OR node stands alone, so a run of
//!   ANDs binds tighter than the OR that follows it. Order is never changed.

use crate::error::{SqlError, SqlResult};
use std::fmt;
use std::str::FromStr;

/// Boolean connective joining a condition to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl Connective {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One leaf or group condition.
///
/// `text` only ever references values through placeholders; literals live in
/// the builder's binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionNode {
    connective: Connective,
    text: String,
    is_group: bool,
}

impl ConditionNode {
    /// A single predicate.
    pub fn leaf(connective: Connective, text: impl Into<String>) -> Self {
        Self {
            connective,
            text: text.into(),
            is_group: false,
        }
    }

    /// A parenthesized sub-expression. `text` must already carry its parentheses.
    pub fn group(connective: Connective, text: impl Into<String>) -> Self {
        Self {
            connective,
            text: text.into(),
            is_group: true,
        }
    }

    pub fn connective(&self) -> Connective {
        self.connective
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }
}

/// Comparison operators accepted by `where_op` / `where_cmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<>`
    NotEqual,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl Op {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::NotEqual => "<>",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Lte => "<=",
            Op::Gte => ">=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
        }
    }
}

impl FromStr for Op {
    type Err = SqlError;

    /// Parse an operator. Matching is exact: `LIKE` and `NOT LIKE` must be
    /// upper case with a single space.
    fn from_str(s: &str) -> SqlResult<Self> {
        match s {
            "=" => Ok(Op::Eq),
            "!=" => Ok(Op::Ne),
            "<>" => Ok(Op::NotEqual),
            "<" => Ok(Op::Lt),
            ">" => Ok(Op::Gt),
            "<=" => Ok(Op::Lte),
            ">=" => Ok(Op::Gte),
            "LIKE" => Ok(Op::Like),
            "NOT LIKE" => Ok(Op::NotLike),
            _ => Err(SqlError::InvalidOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Join node texts with ` AND `, ignoring connectives.
pub(crate) fn join_and(nodes: &[ConditionNode]) -> String {
    nodes
        .iter()
        .map(ConditionNode::text)
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Compile a node sequence into a boolean expression (no `WHERE` keyword).
///
/// Returns an empty string for an empty sequence.
pub fn compile_conditions(nodes: &[ConditionNode]) -> String {
    if nodes.iter().all(|n| n.connective == Connective::And) {
        return join_and(nodes);
    }

    let mut groups: Vec<(Connective, Vec<&str>)> = Vec::new();
    let mut and_run: Vec<&str> = Vec::new();
    for node in nodes {
        match node.connective {
            Connective::And => and_run.push(&node.text),
            Connective::Or => {
                if !and_run.is_empty() {
                    groups.push((Connective::And, std::mem::take(&mut and_run)));
                }
                groups.push((Connective::Or, vec![&node.text]));
            }
        }
    }
    if !and_run.is_empty() {
        groups.push((Connective::And, and_run));
    }

    let mut sql = String::new();
    for (i, (connective, members)) in groups.iter().enumerate() {
        if i > 0 {
            sql.push(' ');
            sql.push_str(connective.as_sql());
            sql.push(' ');
        }
        let joined = members.join(" AND ");
        if members.len() > 1 {
            sql.push('(');
            sql.push_str(&joined);
            sql.push(')');
        } else {
            sql.push_str(&joined);
        }
    }
    sql
}

/// Compile a node sequence into ` WHERE …`, or an empty string.
pub fn compile_where(nodes: &[ConditionNode]) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    format!(" WHERE {}", compile_conditions(nodes))
}
