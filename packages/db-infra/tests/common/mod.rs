#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;
use std::time::Duration;

use db_infra::{ConnectionPool, PoolConfig, QueryExecutor, QueryRequest, Row};
use tempfile::TempDir;

pub const NOTES_SCHEMA: &[&str] = &[
    "CREATE TABLE notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL)",
    "CREATE TABLE parents (id INTEGER PRIMARY KEY)",
    "CREATE TABLE children (id INTEGER PRIMARY KEY, parent_id INTEGER NOT NULL \
     REFERENCES parents(id) DEFERRABLE INITIALLY DEFERRED)",
];

/// File-backed SQLite database that lives as long as the struct.
pub struct ScratchDb {
    _dir: TempDir,
    pub pool: Arc<ConnectionPool>,
    pub executor: QueryExecutor,
}

pub async fn scratch_db(limit: u32) -> ScratchDb {
    scratch_db_with_timeout(limit, Duration::from_secs(5)).await
}

pub async fn scratch_db_with_timeout(limit: u32, acquire_timeout: Duration) -> ScratchDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = PoolConfig::sqlite(dir.path().join("scratch.db"))
        .with_connection_limit(limit)
        .with_acquire_timeout(acquire_timeout);
    let pool = Arc::new(ConnectionPool::connect(&config).await.expect("open pool"));
    let executor = QueryExecutor::new(Arc::clone(&pool));

    for stmt in NOTES_SCHEMA {
        executor
            .execute(None, &QueryRequest::new("schema", *stmt))
            .await
            .expect("create schema");
    }

    ScratchDb {
        _dir: dir,
        pool,
        executor,
    }
}

pub async fn count_rows(executor: &QueryExecutor, table: &str) -> i64 {
    let result = executor
        .execute(
            None,
            &QueryRequest::new("count", format!("SELECT COUNT(*) AS n FROM {table}")),
        )
        .await
        .expect("count rows");
    result
        .first_row()
        .expect("count row")
        .try_get::<i64, _>("n")
        .expect("count column")
}

pub fn insert_note(body: &str) -> QueryRequest {
    QueryRequest::new("notes | insert", "INSERT INTO notes (body) VALUES (?)").bind(body)
}
