//! Environment-driven configuration.

use std::env;
use std::str::FromStr;

use crate::error::AppError;

pub mod app;
pub mod db;

/// Get required environment variable or return error
pub(crate) fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}

pub(crate) fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional variable, falling back to `default` when unset.
pub(crate) fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AppError::config(format!("Environment variable '{name}' has an invalid value: '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}
