use std::env;
use std::time::Duration;

use db_infra::config::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_CONNECTION_LIMIT};
use db_infra::PoolConfig;

use super::{must_var, parse_var, var_or};
use crate::error::AppError;

/// Build the pool configuration from `DB_*` variables.
///
/// `DATABASE_URL`, when set, replaces host/port/credentials/name; the pool
/// size and acquire timeout still apply.
pub fn pool_config_from_env() -> Result<PoolConfig, AppError> {
    let connection_limit = parse_var("DB_CONNECTION_LIMIT", DEFAULT_CONNECTION_LIMIT)?;
    let acquire_timeout = Duration::from_secs(parse_var(
        "DB_ACQUIRE_TIMEOUT_SECS",
        DEFAULT_ACQUIRE_TIMEOUT.as_secs(),
    )?);

    let config = match env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => PoolConfig::url(url.trim()),
        _ => PoolConfig::mysql(
            var_or("DB_HOST", "127.0.0.1"),
            parse_var("DB_PORT", 3306u16)?,
            must_var("DB_USER")?,
            must_var("DB_PASSWORD")?,
            must_var("DB_NAME")?,
        ),
    }
    .with_connection_limit(connection_limit)
    .with_acquire_timeout(acquire_timeout);

    config
        .validate()
        .map_err(|e| AppError::config(e.to_string()))?;
    Ok(config)
}
