use std::collections::BTreeMap;

use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use db_infra::DbError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::errors::domain::DomainError;

/// Message sent to clients for failures whose detail stays in the logs.
pub const GENERIC_DB_MESSAGE: &str = "A database error occurred. Please try again later.";

/// The `error` member of the response envelope: one message, or a list
/// (empty when the detail lives in `result`, as with field validation).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiErrorField {
    Message(String),
    List(Vec<String>),
}

/// Uniform response body: `{status, result, error}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    pub result: T,
    pub error: Option<ApiErrorField>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            status: true,
            result,
            error: Some(ApiErrorField::List(Vec::new())),
        }
    }
}

/// Empty `{}` result used by failure envelopes.
#[derive(Debug, Default, Serialize)]
pub struct EmptyResult {}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Per-field validation messages, rendered into `result`.
    #[error("Invalid fields: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    InvalidFields(BTreeMap<String, String>),
    #[error("Bad request: {detail}")]
    BadRequest { detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(e) => match e {
                DomainError::DuplicateEmail => StatusCode::CONFLICT,
                DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::Db(DbError::PoolExhausted { .. }) => StatusCode::SERVICE_UNAVAILABLE,
                DomainError::InsertFailed(_)
                | DomainError::ProfileInsertFailed(_)
                | DomainError::PasswordUpdateFailed(_)
                | DomainError::Internal(_)
                | DomainError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InvalidFields(_) | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text placed in the envelope's `error` member.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Db(DbError::EmptyResult { message, .. })) => {
                message.clone()
            }
            AppError::Domain(DomainError::Db(_) | DomainError::Internal(_)) => {
                GENERIC_DB_MESSAGE.to_string()
            }
            AppError::Domain(e) => e.to_string(),
            AppError::InvalidFields(_) => String::new(),
            AppError::BadRequest { detail } | AppError::Unauthorized { detail } => detail.clone(),
            AppError::Internal { .. } | AppError::Config { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        AppError::Domain(DomainError::Db(e))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        match self {
            AppError::InvalidFields(fields) => HttpResponse::build(status).json(ApiResponse {
                status: false,
                result: fields,
                error: Some(ApiErrorField::List(Vec::new())),
            }),
            _ => HttpResponse::build(status).json(ApiResponse {
                status: false,
                result: EmptyResult::default(),
                error: Some(ApiErrorField::Message(self.client_message())),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_statuses() {
        assert_eq!(
            AppError::from(DomainError::DuplicateEmail).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(DomainError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(DomainError::validation("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(DbError::PoolExhausted {
                message: "busy".into()
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_driver_detail_is_not_sent_to_clients() {
        let err = AppError::from(DbError::config("secret dsn"));
        assert_eq!(err.client_message(), GENERIC_DB_MESSAGE);
    }

    #[test]
    fn test_business_messages_pass_through() {
        let err = AppError::from(DomainError::DuplicateEmail);
        assert_eq!(err.client_message(), "Email address is already registered.");
    }

    #[test]
    fn test_envelope_serialization() {
        let body = serde_json::to_value(ApiResponse {
            status: false,
            result: EmptyResult::default(),
            error: Some(ApiErrorField::Message("nope".into())),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": false, "result": {}, "error": "nope"})
        );

        let ok = serde_json::to_value(ApiResponse::ok(serde_json::json!({"id": 1}))).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"status": true, "result": {"id": 1}, "error": []})
        );
    }
}
