use super::Nested;
use crate::binding::{Bindings, placeholder, prefix};
use crate::condition::{ConditionNode, Connective, Op, compile_conditions, join_and};
use crate::error::SqlResult;
use crate::ident::quote;
use crate::value::Value;

/// WHERE-building methods shared by [`super::QueryBuilder`] and nested scopes.
///
/// Every value-taking method stores the value in the binding table under a
/// fresh name; only the placeholder reaches the SQL text.
pub trait WhereBuilder: Sized {
    /// Split borrow of the condition sequence and the binding table.
    #[doc(hidden)]
    fn parts_mut(&mut self) -> (&mut Vec<ConditionNode>, &mut Bindings);

    /// `column = value`
    fn where_(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_cmp(column, Op::Eq, value)
    }

    /// `column <op> value` with the operator given as text.
    ///
    /// Fails with [`crate::SqlError::InvalidOperator`] for anything outside
    /// `=, !=, <>, <, >, <=, >=, LIKE, NOT LIKE`.
    fn where_op(self, column: &str, op: &str, value: impl Into<Value>) -> SqlResult<Self> {
        let op: Op = op.parse()?;
        Ok(self.where_cmp(column, op, value))
    }

    /// `column <op> value` with a typed operator.
    fn where_cmp(mut self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        let (nodes, bindings) = self.parts_mut();
        let name = bindings.allocate(prefix::WHERE, value);
        nodes.push(ConditionNode::leaf(
            Connective::And,
            format!("{} {} {}", quote(column), op.as_sql(), placeholder(&name)),
        ));
        self
    }

    /// Raw AND condition. `bindings` are merged under the caller's names.
    fn where_raw(mut self, sql: &str, bindings: &[(&str, Value)]) -> Self {
        let (nodes, table) = self.parts_mut();
        nodes.push(ConditionNode::leaf(Connective::And, sql));
        table.merge(bindings);
        self
    }

    /// Raw OR condition, parenthesized.
    fn or_where_raw(mut self, sql: &str, bindings: &[(&str, Value)]) -> Self {
        let (nodes, table) = self.parts_mut();
        nodes.push(ConditionNode::group(Connective::Or, format!("({sql})")));
        table.merge(bindings);
        self
    }

    /// OR group whose members are ANDed together.
    ///
    /// ```ignore
    /// qb.where_("status", "active")
    ///     .or_where(|q| q.where_("role", "admin").where_("verified", true))
    /// // WHERE `status` = :w1 OR (`role` = :w2 AND `verified` = :w3)
    /// ```
    fn or_where<F>(mut self, build: F) -> Self
    where
        F: for<'n> FnOnce(Nested<'n>) -> Nested<'n>,
    {
        let (nodes, bindings) = self.parts_mut();
        let collected = build(Nested::new(bindings)).into_nodes();
        if !collected.is_empty() {
            nodes.push(ConditionNode::group(
                Connective::Or,
                format!("({})", join_and(&collected)),
            ));
        }
        self
    }

    /// AND group compiled with full AND/OR precedence.
    fn where_nested<F>(self, build: F) -> Self
    where
        F: for<'n> FnOnce(Nested<'n>) -> Nested<'n>,
    {
        self.where_nested_with(Connective::And, build)
    }

    /// OR group compiled with full AND/OR precedence.
    fn or_where_nested<F>(self, build: F) -> Self
    where
        F: for<'n> FnOnce(Nested<'n>) -> Nested<'n>,
    {
        self.where_nested_with(Connective::Or, build)
    }

    /// Nested group joined to the preceding conditions by `connective`.
    fn where_nested_with<F>(mut self, connective: Connective, build: F) -> Self
    where
        F: for<'n> FnOnce(Nested<'n>) -> Nested<'n>,
    {
        let (nodes, bindings) = self.parts_mut();
        let collected = build(Nested::new(bindings)).into_nodes();
        if !collected.is_empty() {
            nodes.push(ConditionNode::group(
                connective,
                format!("({})", compile_conditions(&collected)),
            ));
        }
        self
    }

    /// `column IN (...)`. An empty list yields the unsatisfiable `0 = 1`.
    fn where_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let (nodes, bindings) = self.parts_mut();
        let placeholders: Vec<String> = values
            .into_iter()
            .map(|v| placeholder(&bindings.allocate(prefix::IN_LIST, v)))
            .collect();
        let text = if placeholders.is_empty() {
            "0 = 1".to_string()
        } else {
            format!("{} IN ({})", quote(column), placeholders.join(", "))
        };
        nodes.push(ConditionNode::leaf(Connective::And, text));
        self
    }

    /// `column IS NULL`
    fn where_null(mut self, column: &str) -> Self {
        let (nodes, _) = self.parts_mut();
        nodes.push(ConditionNode::leaf(
            Connective::And,
            format!("{} IS NULL", quote(column)),
        ));
        self
    }

    /// `column IS NOT NULL`
    fn where_not_null(mut self, column: &str) -> Self {
        let (nodes, _) = self.parts_mut();
        nodes.push(ConditionNode::leaf(
            Connective::And,
            format!("{} IS NOT NULL", quote(column)),
        ));
        self
    }
}
