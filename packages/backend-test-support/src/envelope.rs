//! Response envelope test helpers
//!
//! Assertions for the uniform `{status, result, error}` body without
//! depending on backend types.

use actix_web::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Local envelope struct that matches the backend's response shape
#[derive(Debug, Deserialize)]
pub struct EnvelopeLike {
    pub status: bool,
    pub result: Value,
    pub error: Value,
}

/// Parse a response body as the uniform envelope.
pub fn parse_envelope(body_bytes: &[u8]) -> EnvelopeLike {
    let body_str =
        String::from_utf8(body_bytes.to_vec()).expect("Response body should be valid UTF-8");
    serde_json::from_str(&body_str).expect("Response body should be a {status, result, error} envelope")
}

/// Assert that a ServiceResponse is a failure envelope
///
/// Validates:
/// - HTTP status matches expected
/// - `status` is false
/// - `error` is the expected message string
pub async fn assert_failure_envelope(
    resp: actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
    expected_status: StatusCode,
    expected_error: &str,
) -> EnvelopeLike {
    assert_eq!(resp.status(), expected_status);
    let body = actix_web::test::read_body(resp).await;
    let envelope = parse_envelope(&body);

    assert!(!envelope.status, "Expected status=false, got {envelope:?}");
    assert_eq!(
        envelope.error.as_str(),
        Some(expected_error),
        "Unexpected error field in {envelope:?}"
    );
    envelope
}

/// Assert that a ServiceResponse is a success envelope and return it
pub async fn assert_success_envelope(
    resp: actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
) -> EnvelopeLike {
    assert_eq!(resp.status(), StatusCode::OK);
    let body = actix_web::test::read_body(resp).await;
    let envelope = parse_envelope(&body);

    assert!(envelope.status, "Expected status=true, got {envelope:?}");
    assert_eq!(
        envelope.error,
        serde_json::json!([]),
        "Success envelope should carry an empty error list"
    );
    envelope
}
