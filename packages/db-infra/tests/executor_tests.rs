//! Query executor tests against a scratch SQLite database.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{count_rows, insert_note, scratch_db};
use db_infra::{
    DbBackend, DbError, QueryExecutor, QueryRequest, Row, TransactionContext,
    TransactionCoordinator,
};

#[tokio::test]
async fn test_insert_reports_rows_affected_and_insert_id() {
    let db = scratch_db(2).await;

    let first = db.executor.execute(None, &insert_note("one")).await.unwrap();
    let second = db.executor.execute(None, &insert_note("two")).await.unwrap();

    assert_eq!(first.rows_affected, 1);
    assert_eq!(first.last_insert_id, Some(1));
    assert_eq!(second.last_insert_id, Some(2));
    assert!(first.is_empty());
    assert_eq!(db.pool.status().leased, 0);
}

#[tokio::test]
async fn test_select_returns_rows_in_order() {
    let db = scratch_db(2).await;
    for body in ["a", "b", "c"] {
        db.executor.execute(None, &insert_note(body)).await.unwrap();
    }

    let request = QueryRequest::new("notes | list", "SELECT id, body FROM notes WHERE id >= ? ORDER BY id")
        .bind(2);
    let result = db.executor.execute(None, &request).await.unwrap();

    let bodies: Vec<String> = result
        .rows
        .iter()
        .map(|row| row.try_get::<String, _>("body").unwrap())
        .collect();
    assert_eq!(bodies, vec!["b", "c"]);
}

#[tokio::test]
async fn test_required_rows_on_empty_result_fails_with_message() {
    let db = scratch_db(2).await;

    let request = QueryRequest::new("notes | by body", "SELECT id FROM notes WHERE body = ?")
        .bind("missing")
        .require_rows("Note not found.");
    let err = db.executor.execute(None, &request).await.unwrap_err();

    match err {
        DbError::EmptyResult { label, message } => {
            assert_eq!(label, "notes | by body");
            assert_eq!(message, "Note not found.");
        }
        other => panic!("Expected EmptyResult, got {other:?}"),
    }
    assert_eq!(db.pool.status().leased, 0);
}

#[tokio::test]
async fn test_required_rows_uses_default_message() {
    let db = scratch_db(2).await;

    let request = QueryRequest::new("notes | all", "SELECT id FROM notes").require_rows("No Data");
    let err = db.executor.execute(None, &request).await.unwrap_err();
    assert_eq!(err.to_string(), "No Data");
}

#[tokio::test]
async fn test_required_rows_passes_when_rows_exist() {
    let db = scratch_db(2).await;
    db.executor.execute(None, &insert_note("here")).await.unwrap();

    let request = QueryRequest::new("notes | all", "SELECT id FROM notes").require_rows("none");
    let result = db.executor.execute(None, &request).await.unwrap();
    assert_eq!(result.rows.len(), 1);
}

#[tokio::test]
async fn test_empty_result_without_requirement_is_success() {
    let db = scratch_db(2).await;

    let request = QueryRequest::new("notes | all", "SELECT id FROM notes");
    let result = db.executor.execute(None, &request).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_driver_error_is_labelled_and_connection_released() {
    let db = scratch_db(1).await;

    let request = QueryRequest::new("notes | broken", "SELECT nope FROM missing_table");
    let err = db.executor.execute(None, &request).await.unwrap_err();
    match err {
        DbError::Driver { label, .. } => assert_eq!(label, "notes | broken"),
        other => panic!("Expected Driver error, got {other:?}"),
    }

    // With a single-connection pool this only succeeds if the failed call released its lease.
    assert_eq!(db.pool.status().leased, 0);
    db.executor.execute(None, &insert_note("after")).await.unwrap();
}

#[tokio::test]
async fn test_slow_queries_are_counted_without_changing_outcome() {
    let db = scratch_db(2).await;
    let executor = QueryExecutor::with_slow_query_threshold(Arc::clone(&db.pool), Duration::ZERO);

    let result = executor.execute(None, &insert_note("slow")).await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(executor.slow_query_count(), 1);

    let err = executor
        .execute(None, &QueryRequest::new("empty", "SELECT id FROM notes WHERE id = 99").require_rows("none"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "none");
    assert_eq!(executor.slow_query_count(), 2);
}

#[tokio::test]
async fn test_fast_queries_are_not_counted() {
    let db = scratch_db(2).await;
    db.executor.execute(None, &insert_note("fast")).await.unwrap();
    assert_eq!(db.executor.slow_query_count(), 0);
}

#[tokio::test]
async fn test_transaction_connection_stays_leased() {
    let db = scratch_db(2).await;
    let txns = TransactionCoordinator::new(Arc::clone(&db.pool));
    let mut ctx = TransactionContext::new();

    txns.begin(&mut ctx, "notes txn").await.unwrap();
    let lease = ctx.handle().unwrap().lease_id();

    db.executor.execute(Some(&mut ctx), &insert_note("in txn")).await.unwrap();
    db.executor.execute(Some(&mut ctx), &insert_note("in txn too")).await.unwrap();

    assert_eq!(db.pool.status().leased, 1);
    assert_eq!(ctx.handle().unwrap().lease_id(), lease);

    txns.commit(&mut ctx).await.unwrap();
    assert_eq!(db.pool.status().leased, 0);
    assert_eq!(count_rows(&db.executor, "notes").await, 2);
}

#[tokio::test]
async fn test_idle_context_gets_its_own_connection() {
    let db = scratch_db(2).await;
    let mut ctx = TransactionContext::new();

    db.executor.execute(Some(&mut ctx), &insert_note("no txn")).await.unwrap();

    assert!(!ctx.is_active());
    assert_eq!(db.pool.status().leased, 0);
    assert_eq!(count_rows(&db.executor, "notes").await, 1);
}

#[tokio::test]
async fn test_insert_id_inside_transaction_and_not_for_updates() {
    let db = scratch_db(2).await;
    let txns = TransactionCoordinator::new(Arc::clone(&db.pool));
    let mut ctx = TransactionContext::new();
    assert_eq!(db.pool.backend(), DbBackend::Sqlite);

    txns.begin(&mut ctx, "notes txn").await.unwrap();
    let first = db.executor.execute(Some(&mut ctx), &insert_note("one")).await.unwrap();
    let second = db.executor.execute(Some(&mut ctx), &insert_note("two")).await.unwrap();
    assert_eq!(first.last_insert_id, Some(1));
    assert_eq!(second.last_insert_id, Some(2));

    let update = QueryRequest::new("notes | update", "UPDATE notes SET body = ? WHERE id = ?")
        .bind("uno")
        .bind(1);
    let updated = db.executor.execute(Some(&mut ctx), &update).await.unwrap();
    assert_eq!(updated.rows_affected, 1);
    assert_eq!(updated.last_insert_id, None);

    txns.commit(&mut ctx).await.unwrap();
    assert_eq!(db.pool.status().leased, 0);
}
