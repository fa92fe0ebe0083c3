use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sqlx::any::AnyPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection, AnyPool, Executor};
use tracing::{debug, info, trace, warn};

use crate::config::{sanitize_db_url, DbBackend, PoolConfig};
use crate::error::DbError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL_MS: u64 = 500;

type LeaseSet = Arc<Mutex<HashSet<u64>>>;

/// Generate a short random hex ID for pool tracking
fn generate_short_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

/// One leased physical connection.
///
/// The handle is owned by whichever query or transaction acquired it. Handing
/// it back goes through [`ConnectionPool::release`]; a handle dropped without
/// being released still returns its connection to the driver pool.
pub struct ConnectionHandle {
    pool_id: String,
    lease_id: u64,
    backend: DbBackend,
    conn: Option<PoolConnection<Any>>,
    leases: LeaseSet,
}

impl ConnectionHandle {
    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    pub fn lease_id(&self) -> u64 {
        self.lease_id
    }

    pub fn is_released(&self) -> bool {
        self.conn.is_none()
    }

    pub fn backend(&self) -> DbBackend {
        self.backend
    }

    pub(crate) fn connection(&mut self) -> Result<&mut AnyConnection, DbError> {
        self.conn.as_deref_mut().ok_or_else(|| {
            DbError::transaction_state(format!(
                "connection lease {} was already released",
                self.lease_id
            ))
        })
    }

    /// Close the underlying connection instead of returning it for reuse.
    /// Used when the connection may still hold an open transaction.
    pub(crate) fn discard(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.leases.lock().remove(&self.lease_id);
            drop(conn.detach());
            warn!(
                pool_id = %self.pool_id,
                lease_id = self.lease_id,
                "Discarded connection instead of returning it to the pool"
            );
        }
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("pool_id", &self.pool_id)
            .field("lease_id", &self.lease_id)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if self.conn.is_some() {
            self.leases.lock().remove(&self.lease_id);
        }
    }
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub max_size: u32,
    /// Physical connections currently open.
    pub size: u32,
    pub idle: usize,
    /// Handles issued and not yet released.
    pub leased: usize,
}

/// Bounded pool of database connections.
///
/// At most `connection_limit` connections exist; acquires beyond that wait
/// for a release (up to the configured acquire timeout).
pub struct ConnectionPool {
    id: String,
    pool: AnyPool,
    backend: DbBackend,
    max_size: u32,
    leases: LeaseSet,
    next_lease: AtomicU64,
}

impl ConnectionPool {
    /// Open a pool for the given configuration.
    pub async fn connect(config: &PoolConfig) -> Result<Self, DbError> {
        config.validate()?;
        sqlx::any::install_default_drivers();

        let url = config.connection_url();
        let backend = config.backend()?;
        let session_statements = config.session_statements();

        let options = AnyPoolOptions::new()
            .max_connections(config.connection_limit)
            .acquire_timeout(config.acquire_timeout)
            .after_connect(move |conn, _meta| {
                let statements = session_statements.clone();
                Box::pin(async move {
                    for stmt in &statements {
                        (&mut *conn).execute(stmt.as_str()).await?;
                    }
                    Ok(())
                })
            });

        debug!(
            url = %sanitize_db_url(&url),
            connection_limit = config.connection_limit,
            "Creating connection pool"
        );

        let pool = if backend == DbBackend::MySql {
            retry_connection(
                || {
                    let options = options.clone();
                    let url = url.clone();
                    async move {
                        options.connect(&url).await.map_err(|e| {
                            DbError::config(format!("failed to connect to MySQL: {e}"))
                        })
                    }
                },
                CONNECT_ATTEMPTS,
                CONNECT_RETRY_INTERVAL_MS,
            )
            .await?
        } else {
            options
                .connect(&url)
                .await
                .map_err(|e| DbError::config(format!("failed to open SQLite database: {e}")))?
        };

        let id = generate_short_id();
        info!(
            pool_id = %id,
            url = %sanitize_db_url(&url),
            connection_limit = config.connection_limit,
            "Connection pool ready"
        );

        Ok(Self {
            id,
            pool,
            backend,
            max_size: config.connection_limit,
            leases: Arc::new(Mutex::new(HashSet::new())),
            next_lease: AtomicU64::new(1),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn backend(&self) -> DbBackend {
        self.backend
    }

    /// Lease a connection, waiting for one to free up when the pool is full.
    pub async fn acquire(&self) -> Result<ConnectionHandle, DbError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DbError::from_acquire("acquire connection", e))?;

        let lease_id = self.next_lease.fetch_add(1, Ordering::Relaxed);
        self.leases.lock().insert(lease_id);
        trace!(pool_id = %self.id, lease_id, "Connection acquired");

        Ok(ConnectionHandle {
            pool_id: self.id.clone(),
            lease_id,
            backend: self.backend,
            conn: Some(conn),
            leases: Arc::clone(&self.leases),
        })
    }

    /// Return a handle's connection to the pool.
    ///
    /// Only handles that this pool issued and has not yet taken back are
    /// released; anything else (already released, issued by another pool) is
    /// ignored.
    pub fn release(&self, handle: &mut ConnectionHandle) {
        if handle.pool_id != self.id {
            trace!(
                pool_id = %self.id,
                handle_pool_id = %handle.pool_id,
                "Ignoring release of a handle from another pool"
            );
            return;
        }

        let was_leased = self.leases.lock().remove(&handle.lease_id);
        if !was_leased {
            trace!(pool_id = %self.id, lease_id = handle.lease_id, "Ignoring stale release");
            return;
        }

        // Dropping the pooled connection hands it back to the driver pool.
        handle.conn.take();
        trace!(pool_id = %self.id, lease_id = handle.lease_id, "Connection released");
    }

    /// Close the pool and every idle connection. Waits for leased
    /// connections to come back first; call once at shutdown.
    pub async fn close_all(&self) {
        info!(pool_id = %self.id, "Closing connection pool");
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            max_size: self.max_size,
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            leased: self.leases.lock().len(),
        }
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}

/// Retry a connection attempt with fixed interval delays
/// Returns the result of the last attempt after all retries are exhausted
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, interval_ms, "Connection retry succeeded");
                }
                return Ok(result);
            }
            Err(e) => {
                warn!(attempt, max_attempts, interval_ms, error = %e, "Connection attempt failed");
                last_error = Some(e);
                if attempt < max_attempts {
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| DbError::config("no connection attempts were made")))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;

    #[tokio::test]
    async fn test_retry_connection_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_connection(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(DbError::config("not yet"))
                    } else {
                        Ok(n)
                    }
                }
            },
            5,
            1,
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_connection_gives_up_with_last_error() {
        let result: Result<(), DbError> =
            retry_connection(|| async { Err(DbError::config("down")) }, 3, 1).await;
        assert!(result.unwrap_err().to_string().contains("down"));
    }

    #[test]
    fn test_short_id_is_eight_hex_chars() {
        let id = generate_short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
