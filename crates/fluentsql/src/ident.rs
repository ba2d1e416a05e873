//! Identifier quoting.
//!
//! Column and table references are wrapped in backticks with embedded
//! backticks doubled. References that look like expressions are passed
//! through untouched:
//!
//! - `*`
//! - anything containing `(` or `)` (aggregates, function calls, subqueries)
//! - anything containing ` AS ` in any case (explicit aliases)
//!
//! A dotted reference is split on the first `.` and each side quoted on its
//! own; `table.*` keeps the star bare.
//!
//! # Example
//! ```
//! use fluentsql::ident::quote;
//!
//! assert_eq!(quote("a.b"), "`a`.`b`");
//! assert_eq!(quote("a.*"), "a.*");
//! assert_eq!(quote("COUNT(x) AS n"), "COUNT(x) AS n");
//! ```

/// Returns `true` when `reference` should bypass quoting.
pub fn is_raw_expression(reference: &str) -> bool {
    reference == "*"
        || reference.contains('(')
        || reference.contains(')')
        || reference.to_ascii_uppercase().contains(" AS ")
}

/// Quote a single identifier part.
pub fn quote_part(part: &str) -> String {
    format!("`{}`", part.replace('`', "``"))
}

/// Quote a column or table reference.
pub fn quote(reference: &str) -> String {
    if is_raw_expression(reference) {
        return reference.to_string();
    }
    match reference.split_once('.') {
        Some((table, "*")) => format!("{table}.*"),
        Some((table, column)) => format!("{}.{}", quote_part(table), quote_part(column)),
        None => quote_part(reference),
    }
}

/// Split `"table alias"` into its parts. Anything other than exactly two
/// whitespace-separated words has no alias.
pub(crate) fn split_alias(target: &str) -> (&str, Option<&str>) {
    let mut words = target.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(table), Some(alias), None) => (table, Some(alias)),
        _ => (target.trim(), None),
    }
}

/// Format a FROM/JOIN target: subqueries pass through, `"table alias"`
/// quotes only the table.
pub(crate) fn quote_table_ref(target: &str) -> String {
    let trimmed = target.trim();
    if trimmed.starts_with('(') {
        return target.to_string();
    }
    match split_alias(trimmed) {
        (table, Some(alias)) => format!("{} {}", quote(table), alias),
        (table, None) => quote(table),
    }
}
