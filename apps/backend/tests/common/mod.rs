#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use backend::middleware::request_log::RequestLog;
use backend::routes;
use backend::{AppState, NewUser, SecurityConfig, UserRepository};
use backend_test_support::scratch_db::ScratchDb;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

pub const TEST_SECRET: &[u8] = b"test_secret_key_for_testing_purposes_only";

pub fn security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET)
}

pub fn app_state(db: &ScratchDb) -> AppState {
    AppState::with_executor(Arc::clone(&db.pool), Arc::clone(&db.executor), security())
}

pub fn users(db: &ScratchDb) -> Arc<UserRepository> {
    app_state(db).users
}

pub fn new_user(email: &str, password: Option<&str>) -> NewUser {
    NewUser {
        first_name: "A".into(),
        last_name: "B".into(),
        email_address: email.into(),
        password: password.map(str::to_string),
    }
}

/// Service with the production routes, user routes under `/api/users`.
pub async fn create_test_app(
    db: &ScratchDb,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    let data = web::Data::new(app_state(db));
    test::init_service(
        App::new()
            .wrap(RequestLog)
            .app_data(data)
            .configure(|cfg| routes::configure(cfg, "/api/users")),
    )
    .await
}
