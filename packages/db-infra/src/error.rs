use thiserror::Error;

/// Failures surfaced by the pool, the query executor and the transaction coordinator.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection pool exhausted: {message}")]
    PoolExhausted { message: String },
    #[error("Database error in {label}: {source}")]
    Driver {
        label: String,
        #[source]
        source: sqlx::Error,
    },
    /// The caller required rows and the statement returned none.
    #[error("{message}")]
    EmptyResult { label: String, message: String },
    #[error("Transaction error: {message}")]
    TransactionState { message: String },
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DbError {
    pub fn driver(label: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Driver {
            label: label.into(),
            source,
        }
    }

    pub fn transaction_state(message: impl Into<String>) -> Self {
        Self::TransactionState {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify a failed acquire: timeouts and a closed pool mean no connection
    /// could be handed out, anything else came from the driver.
    pub fn from_acquire(label: impl Into<String>, source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::PoolTimedOut => Self::PoolExhausted {
                message: "timed out waiting for a free connection".to_string(),
            },
            sqlx::Error::PoolClosed => Self::PoolExhausted {
                message: "pool has been closed".to_string(),
            },
            other => Self::driver(label, other),
        }
    }

    pub fn is_pool_exhausted(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }
}
