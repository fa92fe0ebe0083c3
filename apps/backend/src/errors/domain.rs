//! Domain-level error type used by the repositories.
//!
//! This error type is HTTP-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! through the provided `From<DomainError> for AppError` implementation.
//! The `Display` text of each variant is the message shown to clients.

use db_infra::DbError;
use thiserror::Error;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email address is already registered.";
pub const INSERT_FAILED_MESSAGE: &str = "An error occurred while creating user record.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Email address or password is incorrect.";

/// Central domain error type
#[derive(Debug, Error)]
pub enum DomainError {
    /// A password signup collided with an existing email address
    #[error("Email address is already registered.")]
    DuplicateEmail,
    /// The user row could not be written
    #[error("An error occurred while creating user record.")]
    InsertFailed(#[source] DbError),
    #[error("An error occurred while creating user profile record.")]
    ProfileInsertFailed(#[source] DbError),
    /// Setting the password hash on a fresh user row failed
    #[error("An error occurred while updating user password.")]
    PasswordUpdateFailed(#[source] DbError),
    #[error("Email address or password is incorrect.")]
    InvalidCredentials,
    /// Input or business rule violation
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl DomainError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_client_facing() {
        assert_eq!(DomainError::DuplicateEmail.to_string(), DUPLICATE_EMAIL_MESSAGE);
        assert_eq!(
            DomainError::InvalidCredentials.to_string(),
            INVALID_CREDENTIALS_MESSAGE
        );
        assert_eq!(
            DomainError::InsertFailed(DbError::config("boom")).to_string(),
            INSERT_FAILED_MESSAGE
        );
        assert_eq!(DomainError::validation("bad input").to_string(), "bad input");
    }

    #[test]
    fn test_db_errors_keep_their_message() {
        let err: DomainError = DbError::EmptyResult {
            label: "Users | lookup".into(),
            message: "No Data".into(),
        }
        .into();
        assert_eq!(err.to_string(), "No Data");
    }
}
