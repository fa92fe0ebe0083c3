use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::TryStreamExt;
use sqlx::any::AnyRow;
use sqlx::{Either, Executor};
use tracing::{trace, warn};

use super::pool::{ConnectionHandle, ConnectionPool};
use crate::config::DbBackend;
use super::txn::TransactionContext;
use super::value::SqlValue;
use crate::error::DbError;

/// Statements slower than this are reported as slow queries.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_secs(1);

/// Message used when a statement must return rows and none came back.
pub const DEFAULT_EMPTY_MESSAGE: &str = "No Data";

/// A single parameterized statement plus how its result should be judged.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    label: String,
    sql: String,
    args: Vec<SqlValue>,
    require_non_empty: bool,
    empty_message: String,
}

impl QueryRequest {
    /// `label` tags diagnostics (slow-query markers, errors) for this statement.
    pub fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
            args: Vec::new(),
            require_non_empty: false,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn bind_all(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        self.args.extend(values);
        self
    }

    /// Treat an empty result set as a failure carrying `message`.
    pub fn require_rows(mut self, message: impl Into<String>) -> Self {
        self.require_non_empty = true;
        self.empty_message = message.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn requires_rows(&self) -> bool {
        self.require_non_empty
    }

    pub fn empty_message(&self) -> &str {
        &self.empty_message
    }
}

/// Raw result of a successful statement.
#[derive(Default)]
pub struct QueryResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
    pub rows: Vec<AnyRow>,
}

impl QueryResult {
    pub fn first_row(&self) -> Option<&AnyRow> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("rows_affected", &self.rows_affected)
            .field("last_insert_id", &self.last_insert_id)
            .field("rows", &self.rows.len())
            .finish()
    }
}

pub type QueryOutcome = Result<QueryResult, DbError>;

/// Runs statements against either a fresh pooled connection or the
/// connection bound to an active transaction.
pub struct QueryExecutor {
    pool: Arc<ConnectionPool>,
    slow_query_threshold: Duration,
    slow_queries: AtomicU64,
}

impl QueryExecutor {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self::with_slow_query_threshold(pool, SLOW_QUERY_THRESHOLD)
    }

    pub fn with_slow_query_threshold(pool: Arc<ConnectionPool>, threshold: Duration) -> Self {
        Self {
            pool,
            slow_query_threshold: threshold,
            slow_queries: AtomicU64::new(0),
        }
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Number of statements that crossed the slow-query threshold.
    pub fn slow_query_count(&self) -> u64 {
        self.slow_queries.load(Ordering::Relaxed)
    }

    /// Execute `request`.
    ///
    /// With an active transaction the statement runs on the transaction's
    /// connection, which stays leased. Otherwise a connection is acquired for
    /// this call alone and released before returning, whatever the outcome.
    pub async fn execute(
        &self,
        txn: Option<&mut TransactionContext>,
        request: &QueryRequest,
    ) -> QueryOutcome {
        let started = Instant::now();

        let outcome = match txn.and_then(TransactionContext::handle_mut) {
            Some(handle) => run_statement(handle, request).await,
            None => {
                let mut handle = self.pool.acquire().await?;
                let outcome = run_statement(&mut handle, request).await;
                self.pool.release(&mut handle);
                outcome
            }
        };

        self.observe(request, started.elapsed());
        outcome
    }

    fn observe(&self, request: &QueryRequest, elapsed: Duration) {
        if elapsed > self.slow_query_threshold {
            self.slow_queries.fetch_add(1, Ordering::Relaxed);
            warn!(
                label = %request.label,
                elapsed_ms = elapsed.as_millis() as u64,
                "SlowQueryException"
            );
        } else {
            trace!(
                label = %request.label,
                elapsed_ms = elapsed.as_millis() as u64,
                "Query finished"
            );
        }
    }
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("insert"))
}

async fn run_statement(handle: &mut ConnectionHandle, request: &QueryRequest) -> QueryOutcome {
    let backend = handle.backend();
    let conn = handle.connection()?;
    let query = request
        .args
        .iter()
        .fold(sqlx::query(&request.sql), |query, arg| arg.bind_to(query));

    let mut result = QueryResult::default();
    let mut stream = (&mut *conn).fetch_many(query);
    while let Some(step) = stream
        .try_next()
        .await
        .map_err(|e| DbError::driver(&request.label, e))?
    {
        match step {
            Either::Left(done) => {
                result.rows_affected += done.rows_affected();
                if let Some(id) = done.last_insert_id() {
                    result.last_insert_id = Some(id);
                }
            }
            Either::Right(row) => result.rows.push(row),
        }
    }
    drop(stream);

    // The Any driver never reports SQLite rowids; read it back on the same connection.
    if backend == DbBackend::Sqlite
        && result.last_insert_id.is_none()
        && result.rows_affected > 0
        && is_insert(&request.sql)
    {
        let id = sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| DbError::driver(&request.label, e))?;
        result.last_insert_id = Some(id);
    }

    if request.require_non_empty && result.rows.is_empty() {
        return Err(DbError::EmptyResult {
            label: request.label.clone(),
            message: request.empty_message.clone(),
        });
    }

    Ok(result)
}
