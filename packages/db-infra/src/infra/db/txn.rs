use std::sync::Arc;
use std::time::Instant;

use sqlx::Executor;
use tracing::{debug, info, warn};

use super::pool::{ConnectionHandle, ConnectionPool};
use crate::error::DbError;

/// Lifecycle state of a [`TransactionContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    Idle,
    Active,
}

struct ActiveTxn {
    label: String,
    started_at: Instant,
    handle: ConnectionHandle,
}

/// Tracks one in-flight transaction.
///
/// Label, start time and connection are stored together, so a context either
/// holds all three (active) or none of them (idle).
#[derive(Default)]
pub struct TransactionContext {
    active: Option<ActiveTxn>,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TxnState {
        if self.active.is_some() {
            TxnState::Active
        } else {
            TxnState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.label.as_str())
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.active.as_ref().map(|a| a.started_at)
    }

    pub fn handle(&self) -> Option<&ConnectionHandle> {
        self.active.as_ref().map(|a| &a.handle)
    }

    pub(crate) fn handle_mut(&mut self) -> Option<&mut ConnectionHandle> {
        self.active.as_mut().map(|a| &mut a.handle)
    }
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("state", &self.state())
            .field("label", &self.label())
            .finish()
    }
}

impl Drop for TransactionContext {
    fn drop(&mut self) {
        // The connection may still be inside BEGIN; never let it back into the pool.
        if let Some(active) = self.active.as_mut() {
            warn!(label = %active.label, "Transaction dropped without commit or rollback");
            active.handle.discard();
        }
    }
}

/// Begins, commits and rolls back transactions on dedicated pooled connections.
pub struct TransactionCoordinator {
    pool: Arc<ConnectionPool>,
}

impl TransactionCoordinator {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Lease a connection and open a transaction on it.
    ///
    /// Fails with [`DbError::TransactionState`] when `ctx` is already active.
    /// On any failure the context stays idle.
    pub async fn begin(
        &self,
        ctx: &mut TransactionContext,
        label: impl Into<String>,
    ) -> Result<(), DbError> {
        let label = label.into();
        if let Some(current) = ctx.label() {
            return Err(DbError::transaction_state(format!(
                "cannot begin '{label}': transaction '{current}' is still active"
            )));
        }

        let mut handle = self.pool.acquire().await?;
        let began = match handle.connection() {
            Ok(conn) => conn
                .execute("BEGIN")
                .await
                .map_err(|e| DbError::driver(&label, e)),
            Err(e) => Err(e),
        };

        if let Err(e) = began {
            warn!(label = %label, error = %e, "Failed to begin transaction");
            self.pool.release(&mut handle);
            return Err(e);
        }

        debug!(label = %label, lease_id = handle.lease_id(), "Transaction started");
        ctx.active = Some(ActiveTxn {
            label,
            started_at: Instant::now(),
            handle,
        });
        Ok(())
    }

    /// Commit the active transaction and release its connection.
    ///
    /// A failed commit is rolled back before the commit error is returned, so
    /// the context is idle afterwards either way.
    pub async fn commit(&self, ctx: &mut TransactionContext) -> Result<(), DbError> {
        let Some(active) = ctx.active.as_mut() else {
            return Err(DbError::transaction_state(
                "commit called without an active transaction",
            ));
        };

        let committed = match active.handle.connection() {
            Ok(conn) => conn
                .execute("COMMIT")
                .await
                .map(|_| ())
                .map_err(|e| DbError::driver(&active.label, e)),
            Err(e) => Err(e),
        };

        match committed {
            Ok(()) => {
                if let Some(mut active) = ctx.active.take() {
                    self.pool.release(&mut active.handle);
                    info!(
                        label = %active.label,
                        elapsed_ms = active.started_at.elapsed().as_millis() as u64,
                        "Commit transaction"
                    );
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Commit failed, rolling back");
                self.rollback(ctx).await;
                Err(e)
            }
        }
    }

    /// Roll back the active transaction, if any, and release its connection.
    ///
    /// Never fails: an idle context is a no-op, and a failing ROLLBACK still
    /// leaves the context idle (the connection is closed rather than reused).
    pub async fn rollback(&self, ctx: &mut TransactionContext) {
        let Some(mut active) = ctx.active.take() else {
            return;
        };

        let rolled_back = match active.handle.connection() {
            Ok(conn) => conn.execute("ROLLBACK").await.map(|_| ()),
            Err(_) => Ok(()),
        };

        match rolled_back {
            Ok(()) => self.pool.release(&mut active.handle),
            Err(e) => {
                warn!(label = %active.label, error = %e, "Rollback statement failed");
                active.handle.discard();
            }
        }

        info!(
            label = %active.label,
            elapsed_ms = active.started_at.elapsed().as_millis() as u64,
            "Cancel transaction"
        );
    }
}
