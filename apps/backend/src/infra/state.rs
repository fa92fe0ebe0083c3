use std::sync::Arc;

use db_infra::{sanitize_db_url, ConnectionPool, PoolConfig};
use tracing::info;

use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

enum DbSource {
    Config(PoolConfig),
    Pool(Arc<ConnectionPool>),
}

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    db: Option<DbSource>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            db: None,
        }
    }

    /// Connect a new pool from `config` at build time.
    pub fn with_db(mut self, config: PoolConfig) -> Self {
        self.db = Some(DbSource::Config(config));
        self
    }

    /// Reuse an already connected pool.
    pub fn with_pool(mut self, pool: Arc<ConnectionPool>) -> Self {
        self.db = Some(DbSource::Pool(pool));
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let pool = match self.db {
            Some(DbSource::Pool(pool)) => pool,
            Some(DbSource::Config(config)) => {
                let pool = ConnectionPool::connect(&config).await?;
                info!(
                    url = %sanitize_db_url(&config.connection_url()),
                    connection_limit = config.connection_limit,
                    "Database pool ready"
                );
                Arc::new(pool)
            }
            None => return Err(AppError::config("No database configured for application state")),
        };
        Ok(AppState::new(pool, self.security_config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_without_db_is_a_config_error() {
        match build_state().build().await {
            Err(AppError::Config { detail }) => assert!(detail.contains("No database")),
            Err(other) => panic!("Expected config error, got {other:?}"),
            Ok(_) => panic!("Expected config error"),
        }
    }

    #[tokio::test]
    async fn test_build_connects_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let state = build_state()
            .with_db(PoolConfig::sqlite(dir.path().join("state.db")).with_connection_limit(2))
            .build()
            .await
            .unwrap();

        assert_eq!(state.pool.status().max_size, 2);
        state.pool.close_all().await;
    }
}
