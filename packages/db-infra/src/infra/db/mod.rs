pub mod executor;
pub mod pool;
pub mod txn;
pub mod value;
pub mod where_clause;

pub use executor::{
    QueryExecutor, QueryOutcome, QueryRequest, QueryResult, DEFAULT_EMPTY_MESSAGE,
    SLOW_QUERY_THRESHOLD,
};
pub use pool::{ConnectionHandle, ConnectionPool, PoolStatus};
pub use txn::{TransactionContext, TransactionCoordinator, TxnState};
pub use value::SqlValue;
pub use where_clause::WherePredicate;
