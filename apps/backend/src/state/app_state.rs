use std::sync::Arc;

use db_infra::{ConnectionPool, QueryExecutor, TransactionCoordinator};

use super::security_config::SecurityConfig;
use crate::repos::profiles::ProfileRepository;
use crate::repos::users::UserRepository;

/// Shared resources handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ConnectionPool>,
    pub executor: Arc<QueryExecutor>,
    pub users: Arc<UserRepository>,
    pub security: SecurityConfig,
}

impl AppState {
    /// Wire the executor, coordinator and repositories around one pool.
    pub fn new(pool: Arc<ConnectionPool>, security: SecurityConfig) -> Self {
        let executor = Arc::new(QueryExecutor::new(Arc::clone(&pool)));
        Self::with_executor(pool, executor, security)
    }

    /// Like [`AppState::new`] but reusing an existing executor.
    pub fn with_executor(
        pool: Arc<ConnectionPool>,
        executor: Arc<QueryExecutor>,
        security: SecurityConfig,
    ) -> Self {
        let txns = Arc::new(TransactionCoordinator::new(Arc::clone(&pool)));
        let profiles = Arc::new(ProfileRepository::new(Arc::clone(&executor)));
        let users = Arc::new(UserRepository::new(Arc::clone(&executor), txns, profiles));
        Self {
            pool,
            executor,
            users,
            security,
        }
    }
}
