use actix_cors::Cors;
use actix_web::http::header;

/// CORS for the browser client: one explicit origin, cookies allowed.
///
/// An empty or non-http(s) origin falls back to the local dev client.
pub fn cors_middleware(origin: &str) -> Cors {
    let origin = origin.trim();
    let origin = if origin.starts_with("http://") || origin.starts_with("https://") {
        origin
    } else {
        crate::config::app::DEFAULT_CORS_ORIGIN
    };

    Cors::default()
        .allowed_origin(origin)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}
