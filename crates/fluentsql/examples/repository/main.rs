//! Repository-style example for fluentsql
//!
//! Run with: cargo run --example repository -p fluentsql
//!
//! Uses DATABASE_URL from a .env file or the environment when set
//! (e.g. DATABASE_URL=sqlite://app.db), otherwise an in-memory database.
//!
//! Demonstrates a small repository built on the query builder: dynamic
//! search filters, pagination, soft deletes and a join.

use fluentsql::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Optional search filters.
#[derive(Debug, Default)]
struct UserSearch {
    name: Option<String>,
    status: Option<String>,
    age_min: Option<i64>,
    age_max: Option<i64>,
}

struct UserRepository<'a, X: Executor + ?Sized> {
    db: &'a X,
}

impl<'a, X: Executor + ?Sized> UserRepository<'a, X> {
    const TABLE: &'static str = "users";

    fn new(db: &'a X) -> Self {
        Self { db }
    }

    fn find_by_id(&self, id: i64) -> SqlResult<Option<Row>> {
        QueryBuilder::table(Self::TABLE).where_("id", id).first(self.db)
    }

    fn find_active(&self) -> SqlResult<Vec<Row>> {
        QueryBuilder::table(Self::TABLE)
            .where_("status", "active")
            .where_null("deleted_at")
            .order_by_desc("created_at")
            .get(self.db)
    }

    fn search(&self, filter: &UserSearch) -> SqlResult<Vec<Row>> {
        let mut query = QueryBuilder::table(Self::TABLE).where_null("deleted_at");
        if let Some(ref name) = filter.name {
            query = query.where_cmp("name", Op::Like, format!("%{name}%"));
        }
        if let Some(ref status) = filter.status {
            query = query.where_("status", status);
        }
        if let Some(min) = filter.age_min {
            query = query.where_cmp("age", Op::Gte, min);
        }
        if let Some(max) = filter.age_max {
            query = query.where_cmp("age", Op::Lte, max);
        }
        query.order_by("name", "asc")?.get(self.db)
    }

    fn paginate(&self, per_page: u64, page: u64) -> SqlResult<Page> {
        QueryBuilder::table(Self::TABLE)
            .where_null("deleted_at")
            .order_by_asc("id")
            .paginate(self.db, per_page, page)
    }

    fn create(&self, name: &str, email: &str, age: i64) -> SqlResult<i64> {
        QueryBuilder::table(Self::TABLE).insert(
            self.db,
            &[
                ("name", name.into()),
                ("email", email.into()),
                ("age", age.into()),
                ("status", "active".into()),
                ("created_at", now().into()),
            ],
        )
    }

    fn soft_delete(&self, id: i64) -> SqlResult<u64> {
        QueryBuilder::table(Self::TABLE)
            .where_("id", id)
            .update(self.db, &[("deleted_at", now().into())])
    }

    fn count(&self, status: Option<&str>) -> SqlResult<u64> {
        let mut query = QueryBuilder::table(Self::TABLE).where_null("deleted_at");
        if let Some(status) = status {
            query = query.where_("status", status);
        }
        query.count(self.db)
    }

    fn find_by_ids(&self, ids: &[i64]) -> SqlResult<Vec<Row>> {
        QueryBuilder::table(Self::TABLE)
            .where_in("id", ids.iter().copied())
            .get(self.db)
    }
}

fn posts_with_author<X: Executor + ?Sized>(db: &X, limit: u64) -> SqlResult<Vec<Row>> {
    QueryBuilder::table("posts p")
        .left_join("users u", "p.user_id = u.id")
        .select(["p.id", "p.title", "u.name AS author_name"])
        .where_("p.status", "published")
        .or_where(|q| q.where_("p.pinned", true).where_not_null("u.id"))
        .order_by_desc("p.id")
        .limit(limit)
        .get(db)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = SqliteConfig::from_env().unwrap_or_else(|_| SqliteConfig::in_memory());
    println!("Using database: {}", config.database);

    let db = Manager::with_config(SqliteConnector::new(config), ManagerConfig::new().debug(true));

    db.statement(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            age INTEGER,
            status TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            deleted_at INTEGER
        )",
        Params::none(),
    )?;
    db.statement(
        "CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            user_id INTEGER REFERENCES users(id),
            title TEXT NOT NULL,
            status TEXT NOT NULL,
            pinned INTEGER NOT NULL DEFAULT 0
        )",
        Params::none(),
    )?;

    let users = UserRepository::new(&db);

    let alice = users.create("alice", "alice@example.com", 31)?;
    let bob = users.create("bob", "bob@example.com", 24)?;
    let carol = users.create("carol", "carol@example.com", 45)?;
    println!("Created users: {alice}, {bob}, {carol}");

    for (user_id, title, status) in [(alice, "Hello", "published"), (bob, "Draft", "draft")] {
        db.table("posts").insert(
            &db,
            &[
                ("user_id", user_id.into()),
                ("title", title.into()),
                ("status", status.into()),
            ],
        )?;
    }

    if let Some(row) = users.find_by_id(alice)? {
        println!("find_by_id({alice}): {}", serde_json::to_string(&row)?);
    }

    let found = users.search(&UserSearch {
        name: Some("o".into()),
        age_max: Some(40),
        ..UserSearch::default()
    })?;
    println!("search: {} match(es)", found.len());

    users.soft_delete(carol)?;
    println!("active after soft delete: {}", users.find_active()?.len());
    println!("count(active): {}", users.count(Some("active"))?);
    println!("find_by_ids([]): {}", users.find_by_ids(&[])?.len());

    let page = users.paginate(2, 1)?;
    println!(
        "page {}/{}: rows {}..{} of {}",
        page.current_page, page.last_page, page.from, page.to, page.total
    );

    for post in posts_with_author(&db, 10)? {
        println!(
            "post: {} by {}",
            post.try_get::<String>("title")?,
            post.try_get::<Option<String>>("author_name")?.unwrap_or_default()
        );
    }

    Ok(())
}
