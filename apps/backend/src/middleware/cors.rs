use std::env;

use actix_cors::Cors;
use actix_web::http::header;

/// Parse `CORS_ALLOWED_ORIGINS` (comma separated), keeping only http(s) origins.
/// Falls back to the local frontend dev server when nothing valid is configured.
pub fn allowed_origins_from(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(|s| s.trim_end_matches('/').to_string())
        .collect();

    if origins.is_empty() {
        vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ]
    } else {
        origins
    }
}

pub fn cors_middleware() -> Cors {
    let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::IF_MATCH,
            header::HeaderName::from_static("x-device-token"),
        ])
        .expose_headers(vec![
            header::HeaderName::from_static("x-trace-id"),
            header::HeaderName::from_static("x-request-id"),
            header::ETAG,
        ])
        .max_age(3600);

    for origin in allowed_origins_from(&raw) {
        cors = cors.allowed_origin(&origin);
    }

    cors
}
