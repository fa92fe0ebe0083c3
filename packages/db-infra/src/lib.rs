//! Data-access core: pooled connections, parameterized query execution and
//! transactions with rollback-on-failure. Used by the backend app.

pub mod config;
pub mod error;
pub mod infra;

pub use config::{sanitize_db_url, DbBackend, DbTarget, PoolConfig};
pub use error::DbError;
pub use infra::db::{
    ConnectionHandle, ConnectionPool, PoolStatus, QueryExecutor, QueryOutcome, QueryRequest,
    QueryResult, SqlValue, TransactionContext, TransactionCoordinator, TxnState, WherePredicate,
};
pub use sqlx::any::AnyRow;
pub use sqlx::Row;
