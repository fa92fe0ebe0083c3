use super::{must_var, parse_var, var_or};
use crate::error::AppError;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// HTTP server settings read from `BACKEND_*`, `API_PREFIX`, `CORS_ORIGIN`
/// and `JWT_SECRET`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path segment the API is mounted under, without slashes
    pub api_prefix: String,
    pub cors_origin: String,
    pub jwt_secret: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = must_var("JWT_SECRET")?;
        if jwt_secret.trim().is_empty() {
            return Err(AppError::config("JWT_SECRET must not be empty"));
        }

        Ok(Self {
            host: var_or("BACKEND_HOST", "0.0.0.0"),
            port: parse_var("BACKEND_PORT", 3000u16)?,
            api_prefix: var_or("API_PREFIX", "api").trim_matches('/').to_string(),
            cors_origin: var_or("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            jwt_secret,
        })
    }

    /// Scope path for the user routes, e.g. `/api/users`.
    pub fn users_scope(&self) -> String {
        if self.api_prefix.is_empty() {
            "/users".to_string()
        } else {
            format!("/{}/users", self.api_prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::ServerConfig;

    fn clear_test_env() {
        for var in [
            "BACKEND_HOST",
            "BACKEND_PORT",
            "API_PREFIX",
            "CORS_ORIGIN",
            "JWT_SECRET",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_test_env();
        env::set_var("JWT_SECRET", "s3cret");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.users_scope(), "/api/users");
        assert_eq!(config.cors_origin, "http://localhost:5173");
        clear_test_env();
    }

    #[test]
    #[serial]
    fn test_prefix_is_normalised() {
        clear_test_env();
        env::set_var("JWT_SECRET", "s3cret");
        env::set_var("API_PREFIX", "/v1/");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.users_scope(), "/v1/users");
        clear_test_env();
    }

    #[test]
    #[serial]
    fn test_missing_jwt_secret() {
        clear_test_env();
        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }
}
