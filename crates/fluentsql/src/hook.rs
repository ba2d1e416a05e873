//! Statement hooks for observability.
//!
//! A [`QueryHook`] sees every statement the [`crate::Manager`] is about to
//! send, together with its bindings. Hooks observe only; they cannot change
//! or cancel execution.

use crate::binding::Params;
use tracing::Level;

/// The kind of SQL statement being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    /// BEGIN / COMMIT / ROLLBACK
    Transaction,
    Other,
}

impl StatementKind {
    /// Classify by the leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" | "WITH" => StatementKind::Select,
            "INSERT" | "REPLACE" => StatementKind::Insert,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            "BEGIN" | "COMMIT" | "ROLLBACK" | "SAVEPOINT" | "RELEASE" => {
                StatementKind::Transaction
            }
            _ => StatementKind::Other,
        }
    }
}

/// A statement about to be executed.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub sql: &'a str,
    pub params: &'a Params,
    pub kind: StatementKind,
}

impl<'a> QueryContext<'a> {
    pub fn new(sql: &'a str, params: &'a Params) -> Self {
        Self {
            sql,
            params,
            kind: StatementKind::from_sql(sql),
        }
    }
}

/// Observer called before each statement.
pub trait QueryHook: Send + Sync {
    fn before_query(&self, ctx: &QueryContext<'_>);
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A `tracing`-based debug hook that emits each statement and its bindings
/// (rendered as JSON).
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(500),
        }
    }
}

impl TracingSqlHook {
    /// Create a new hook with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn display_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext<'_>) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.display_sql(ctx.sql);
        let params = serde_json::to_string(ctx.params).unwrap_or_else(|e| format!("<{e}>"));
        emit_at_level!(
            self.level,
            target: "fluentsql.sql",
            kind = ?ctx.kind,
            %sql,
            %params,
            "sql"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_kind() {
        assert_eq!(StatementKind::from_sql("  select 1"), StatementKind::Select);
        assert_eq!(StatementKind::from_sql("INSERT INTO t"), StatementKind::Insert);
        assert_eq!(StatementKind::from_sql("ROLLBACK"), StatementKind::Transaction);
        assert_eq!(StatementKind::from_sql("PRAGMA x"), StatementKind::Other);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let hook = TracingSqlHook::new().max_sql_length(2);
        assert_eq!(hook.display_sql("aé"), "a...");
        assert_eq!(hook.display_sql("ab"), "ab");
        assert_eq!(TracingSqlHook::new().no_truncate().display_sql("abc"), "abc");
    }
}
