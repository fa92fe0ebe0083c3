use actix_web::web;

pub mod health;
pub mod users;

/// Register every route. User routes live under `users_scope`
/// (e.g. `/api/users`); health stays at the root.
pub fn configure(cfg: &mut web::ServiceConfig, users_scope: &str) {
    cfg.configure(health::configure_routes)
        .service(web::scope(users_scope).configure(users::configure_routes));
}
