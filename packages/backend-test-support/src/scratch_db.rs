//! Scratch SQLite databases with the users/profiles schema
//!
//! Each [`ScratchDb`] owns a temp directory holding one database file; the
//! file is removed when the struct is dropped.

use std::sync::Arc;
use std::time::Duration;

use db_infra::{ConnectionPool, PoolConfig, QueryExecutor, QueryRequest, Row};
use tempfile::TempDir;

/// Tables the backend reads and writes, in SQLite dialect.
pub const SCHEMA: &[&str] = &[
    "CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email_address TEXT NOT NULL,
        password TEXT NULL,
        is_active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE profiles (
        user_id INTEGER NOT NULL REFERENCES users(id),
        is_private INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

/// Trigger that makes every profile insert fail.
pub const REJECT_PROFILES_TRIGGER: &str = "CREATE TRIGGER reject_profiles BEFORE INSERT ON profiles
    BEGIN
        SELECT RAISE(ABORT, 'profile insert rejected');
    END";

pub struct ScratchDb {
    _dir: TempDir,
    pub pool: Arc<ConnectionPool>,
    pub executor: Arc<QueryExecutor>,
}

impl ScratchDb {
    /// Create a database with [`SCHEMA`] applied.
    pub async fn new() -> Self {
        Self::with_limit(8).await
    }

    pub async fn with_limit(connection_limit: u32) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = PoolConfig::sqlite(dir.path().join("socmed_test.db"))
            .with_connection_limit(connection_limit)
            .with_acquire_timeout(Duration::from_secs(5));
        let pool = Arc::new(
            ConnectionPool::connect(&config)
                .await
                .expect("open scratch pool"),
        );
        let executor = Arc::new(QueryExecutor::new(Arc::clone(&pool)));

        let db = Self {
            _dir: dir,
            pool,
            executor,
        };
        for stmt in SCHEMA {
            db.run(stmt).await;
        }
        db
    }

    /// Run a statement outside any transaction, panicking on failure.
    pub async fn run(&self, sql: &str) {
        self.executor
            .execute(None, &QueryRequest::new("test support | run", sql))
            .await
            .unwrap_or_else(|e| panic!("statement failed: {sql}: {e}"));
    }

    pub async fn count(&self, table: &str) -> i64 {
        let result = self
            .executor
            .execute(
                None,
                &QueryRequest::new(
                    "test support | count",
                    format!("SELECT COUNT(*) AS n FROM {table}"),
                ),
            )
            .await
            .expect("count rows");
        result
            .first_row()
            .expect("count row")
            .try_get::<i64, _>("n")
            .expect("count column")
    }

    /// Make subsequent profile inserts fail.
    pub async fn reject_profile_inserts(&self) {
        self.run(REJECT_PROFILES_TRIGGER).await;
    }
}
