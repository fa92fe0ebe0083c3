#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod error;
pub mod errors;
pub mod infra;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use auth::jwt::{mint_user_token, verify_user_token};
pub use auth::UserClaims;
pub use config::app::ServerConfig;
pub use config::db::pool_config_from_env;
pub use error::{ApiResponse, AppError};
pub use errors::DomainError;
pub use infra::state::build_state;
pub use middleware::cors::cors_middleware;
pub use middleware::request_log::RequestLog;
pub use repos::profiles::ProfileRepository;
pub use repos::users::{NewUser, UserRepository, UserSummary};
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
