//! # fluentsql
//!
//! A fluent SQL statement builder with a small connection/transaction manager.
//!
//! ## Features
//!
//! - **Values are always bound**: every value goes into a named binding table;
//!   SQL text only ever holds `:name` placeholders
//! - **Readable AND/OR grouping**: chained `where_` / `or_where` /
//!   `where_nested` calls compile into one parenthesized `WHERE` clause
//! - **Fail fast**: bad operators, directions and empty inserts are rejected at
//!   the call, before any SQL is sent
//! - **Lazy connection**: [`Manager`] opens its connection on first use and
//!   retries after a failed attempt
//! - **Transactions**: commit on `Ok`, roll back on `Err` and hand back the
//!   original error
//! - **Observability**: a `tracing` hook emits every statement and its bindings
//!
//! ## Query Builder
//!
//! ```ignore
//! use fluentsql::prelude::*;
//!
//! let db = Manager::new(SqliteConnector::in_memory());
//!
//! // SELECT
//! let admins = db
//!     .table("users")
//!     .where_("role", "admin")
//!     .or_where(|q| q.where_("owner", true).where_not_null("verified_at"))
//!     .order_by_desc("created_at")
//!     .get(&db)?;
//!
//! // INSERT
//! let id = db.table("users").insert(&db, &[("name", "alice".into())])?;
//!
//! // UPDATE
//! db.table("users")
//!     .where_("id", id)
//!     .update(&db, &[("name", "alice b.".into())])?;
//!
//! // DELETE
//! db.table("users").where_("id", id).delete(&db)?;
//! ```

pub mod binding;
pub mod builder;
pub mod condition;
pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod executor;
pub mod hook;
pub mod ident;
pub mod manager;
pub mod prelude;
pub mod row;
pub mod value;

pub use binding::{Bindings, Params};
pub use builder::{CompiledQuery, JoinKind, Nested, Page, QueryBuilder, WhereBuilder};
pub use condition::{ConditionNode, Connective, Op};
pub use config::{ManagerConfig, SqliteConfig};
pub use driver::{Connection, Connector, Execution};
pub use error::{SqlError, SqlResult};
pub use executor::{Executor, transaction};
pub use hook::{QueryContext, QueryHook, StatementKind, TracingSqlHook};
pub use manager::{ConnectionState, Manager};
pub use row::Row;
pub use value::{FromValue, Value};

#[cfg(feature = "sqlite")]
pub use driver::sqlite::{SqliteConnection, SqliteConnector};
