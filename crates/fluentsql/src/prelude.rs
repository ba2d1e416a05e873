//! Convenient imports for typical `fluentsql` usage.
//!
//! ```ignore
//! use fluentsql::prelude::*;
//! ```

pub use crate::{
    Connective, Executor, Manager, ManagerConfig, Op, Page, Params, QueryBuilder, Row, SqlError,
    SqlResult, Value, WhereBuilder,
};

#[cfg(feature = "sqlite")]
pub use crate::{SqliteConfig, SqliteConnector};
