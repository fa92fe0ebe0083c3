use actix_web::{web, HttpResponse};
use db_infra::QueryRequest;
use serde::Serialize;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct PoolSnapshot {
    max_size: u32,
    size: u32,
    idle: usize,
    leased: usize,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    db: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    pool: PoolSnapshot,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ping = QueryRequest::new("Health | ping", "SELECT 1 AS health_check");
    let (db, db_error) = match app_state.executor.execute(None, &ping).await {
        Ok(_) => ("ok", None),
        Err(e) => ("error", Some(e.to_string())),
    };

    let status = app_state.pool.status();
    let response = HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        db,
        db_error,
        pool: PoolSnapshot {
            max_size: status.max_size,
            size: status.size,
            idle: status.idle,
            leased: status.leased,
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
