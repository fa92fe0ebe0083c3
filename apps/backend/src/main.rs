use actix_web::{web, App, HttpServer};
use backend::config::app::ServerConfig;
use backend::config::db::pool_config_from_env;
use backend::infra::state::build_state;
use backend::middleware::cors::cors_middleware;
use backend::middleware::request_log::RequestLog;
use backend::routes;
use backend::state::security_config::SecurityConfig;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or `set -a; . ./.env; set +a` locally).
    let server = match ServerConfig::from_env() {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Invalid server configuration");
            std::process::exit(1);
        }
    };
    let pool_config = match pool_config_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid database configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_db(pool_config)
        .with_security(SecurityConfig::new(server.jwt_secret.as_bytes()))
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    let pool = app_state.pool.clone();
    let data = web::Data::new(app_state);
    let users_scope = server.users_scope();
    let cors_origin = server.cors_origin.clone();

    info!(host = %server.host, port = server.port, "Starting backend");

    let result = HttpServer::new(move || {
        let users_scope = users_scope.clone();
        App::new()
            .wrap(cors_middleware(&cors_origin))
            .wrap(RequestLog)
            .app_data(data.clone())
            .configure(move |cfg| routes::configure(cfg, &users_scope))
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await;

    pool.close_all().await;
    info!("Database pool closed");
    result
}
